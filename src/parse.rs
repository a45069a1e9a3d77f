use std::io::BufRead;

use crate::PatchError;

/// A parsed rewrite rule. Both kinds replace literal substrings: `find` is
/// never a pattern, so a rule applies exactly what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `s/find/replace/`: replace every occurrence of `find` in the
    /// current line.
    Sub { find: String, replace: String },
    /// `n/marker/find/replace/`: when the current line contains `marker`,
    /// replace every occurrence of `find` in the line after it. Applies
    /// nothing when the marker sits on the last line.
    SubNext {
        marker: String,
        find: String,
        replace: String,
    },
}

/// Parse one rule per CLI argv token.
pub fn parse_rules_from_args(args: &[String]) -> Result<Vec<Rule>, PatchError> {
    let mut out = Vec::with_capacity(args.len());
    for a in args {
        out.push(parse_rule(a)?);
    }
    Ok(out)
}

/// Parse a single rule argument.
///
/// Segments are `/`-delimited. A backslash escapes the next character;
/// `\n` and `\t` stand for newline and tab so rule text can carry them.
/// The delimiter after the last segment is optional.
pub fn parse_rule(spec: &str) -> Result<Rule, PatchError> {
    let spec = spec.trim();
    let mut chars = spec.chars();
    let kind = chars.next().ok_or_else(|| PatchError::new("empty rule"))?;
    let rest = chars.as_str();

    match kind {
        's' => {
            let (find, after) = parse_delimited(rest, '/')?;
            let (replace, trailing) = scan_segment(after, '/', false)?;
            reject_trailing(trailing)?;
            if find.is_empty() {
                return Err(PatchError::new("rule find text may not be empty"));
            }
            Ok(Rule::Sub { find, replace })
        }
        'n' => {
            let (marker, after) = parse_delimited(rest, '/')?;
            let (find, after) = scan_segment(after, '/', true)?;
            let (replace, trailing) = scan_segment(after, '/', false)?;
            reject_trailing(trailing)?;
            if marker.is_empty() {
                return Err(PatchError::new("rule marker may not be empty"));
            }
            if find.is_empty() {
                return Err(PatchError::new("rule find text may not be empty"));
            }
            Ok(Rule::SubNext {
                marker,
                find,
                replace,
            })
        }
        _ => Err(PatchError::new(format!(
            "unknown rule kind: {kind} (expected s/find/replace/ or n/marker/find/replace/)"
        ))),
    }
}

fn reject_trailing(trailing: &str) -> Result<(), PatchError> {
    if trailing.trim().is_empty() {
        Ok(())
    } else {
        Err(PatchError::new(format!(
            "unexpected trailing characters in rule: {:?}",
            trailing
        )))
    }
}

/// Parse a `/.../` delimited segment from the start of `input`.
///
/// Returns (decoded, rest_after_closing_delim).
fn parse_delimited(input: &str, delim: char) -> Result<(String, &str), PatchError> {
    let rest = input.strip_prefix(delim).ok_or_else(|| {
        PatchError::new(format!("rule segment must start with {delim:?}"))
    })?;
    scan_segment(rest, delim, true)
}

/// Scan up to the next unescaped `delim`, returning (decoded, rest_after_delim).
///
/// With `require_delim`, running out of input is an error; otherwise the
/// remaining input is the segment (allows an optional trailing delimiter).
fn scan_segment(
    input: &str,
    delim: char,
    require_delim: bool,
) -> Result<(String, &str), PatchError> {
    let mut out = String::new();
    let mut escaped = false;
    let mut consumed = 0;
    for ch in input.chars() {
        consumed += ch.len_utf8();
        if escaped {
            out.push(unescape(ch));
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == delim {
            return Ok((out, &input[consumed..]));
        }
        out.push(ch);
    }
    if escaped {
        return Err(PatchError::new("dangling escape at end of rule"));
    }
    if require_delim {
        return Err(PatchError::new(format!(
            "missing closing {delim:?} in rule"
        )));
    }
    Ok((out, ""))
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        other => other,
    }
}

/// Read an insertion block from `input` until a line with just `.`
/// (as in ex/ed). A line of `..` stands for a literal `.`.
pub fn read_block_from_bufread(input: &mut impl BufRead) -> Result<Vec<String>, PatchError> {
    let mut out = Vec::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        let n = input
            .read_line(&mut buf)
            .map_err(|e| PatchError::new(format!("failed to read stdin: {e}")))?;
        if n == 0 {
            return Err(PatchError::new(
                "unexpected EOF while reading block (terminate with '.')",
            ));
        }
        // Trim \n, then optional \r.
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        if buf == "." {
            break;
        }
        if buf == ".." {
            out.push(".".to_string());
        } else {
            out.push(buf.clone());
        }
    }
    Ok(out)
}
