use crate::lines::{join_lines, split_lines, Ending, Line};
use crate::parse::Rule;

/// Region-scoped rule set.
///
/// The region opens at the first line containing `start` (that line is
/// already subject to the rules). With no `end` it never closes and every
/// later line stays in the region. With an `end`, a line containing it is
/// still processed and then closes the region; a later `start` re-opens it.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub start: String,
    pub end: Option<String>,
    pub rules: Vec<Rule>,
}

/// Result of applying a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Full rewritten content as lines with their original terminators.
    pub lines: Vec<Line>,
    /// 1-based line where the region first opened, if the start marker
    /// occurred at all.
    pub region_start: Option<usize>,
    /// 1-based output line numbers whose text actually changed.
    pub modified: Vec<usize>,
}

impl RewriteOutcome {
    pub fn text(&self) -> String {
        join_lines(&self.lines)
    }

    pub fn changed(&self) -> bool {
        !self.modified.is_empty()
    }
}

struct Slot {
    line: Line,
    modified: bool,
}

/// Walk `input` line by line, applying `rules` to every line inside the
/// active region.
///
/// Rules run in order and each sees the output of the previous one on the
/// same line. A lookahead rule edits the line after its marker in place, so
/// the normal rules still visit that line when the walk reaches it. A rule
/// may leave a `\n` in a line's text; such lines are re-split afterwards,
/// with introduced breaks adopting the line's own terminator kind.
pub fn rewrite_lines(input: &str, rules: &RuleSet) -> RewriteOutcome {
    let mut slots: Vec<Slot> = split_lines(input)
        .into_iter()
        .map(|line| Slot {
            line,
            modified: false,
        })
        .collect();

    let mut active = false;
    let mut region_start = None;
    for i in 0..slots.len() {
        if !active && slots[i].line.text.contains(&rules.start) {
            active = true;
            if region_start.is_none() {
                region_start = Some(i + 1);
            }
        }
        if !active {
            continue;
        }
        // Whether this line closes the region is decided before any rule
        // touches it, so a rule rewriting the marker text cannot hold the
        // region open or close it early.
        let closes = rules
            .end
            .as_ref()
            .map(|end| slots[i].line.text.contains(end.as_str()))
            .unwrap_or(false);
        for rule in &rules.rules {
            match rule {
                Rule::Sub { find, replace } => {
                    apply_sub(&mut slots[i], find, replace);
                }
                Rule::SubNext {
                    marker,
                    find,
                    replace,
                } => {
                    if slots[i].line.text.contains(marker.as_str()) && i + 1 < slots.len() {
                        apply_sub(&mut slots[i + 1], find, replace);
                    }
                }
            }
        }
        if closes {
            active = false;
        }
    }

    // Expand any embedded breaks and renumber against the output.
    let mut lines = Vec::with_capacity(slots.len());
    let mut modified = Vec::new();
    for slot in slots {
        let was_modified = slot.modified;
        for part in resplit(slot.line) {
            lines.push(part);
            if was_modified {
                modified.push(lines.len());
            }
        }
    }

    RewriteOutcome {
        lines,
        region_start,
        modified,
    }
}

fn apply_sub(slot: &mut Slot, find: &str, replace: &str) {
    if !slot.line.text.contains(find) {
        return;
    }
    let new = slot.line.text.replace(find, replace);
    if new != slot.line.text {
        slot.line.text = new;
        slot.modified = true;
    }
}

/// Split a line whose text picked up embedded `\n`s back into real lines.
///
/// Introduced breaks keep the line's own terminator kind (an explicit
/// `\r\n` in the text stays CRLF); the final fragment keeps the original
/// terminator.
fn resplit(line: Line) -> Vec<Line> {
    if !line.text.contains('\n') {
        return vec![line];
    }
    let Line { text, ending } = line;
    let trailing_break = text.ends_with('\n');
    let mut parts = split_lines(&text);
    if trailing_break {
        parts.push(Line {
            text: String::new(),
            ending: Ending::None,
        });
    }
    let last = parts.len() - 1;
    for (k, part) in parts.iter_mut().enumerate() {
        if k == last {
            part.ending = ending;
        } else if part.ending == Ending::Lf && ending == Ending::CrLf {
            part.ending = Ending::CrLf;
        }
    }
    parts
}
