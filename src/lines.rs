/// Line terminator kind. `None` marks a final line with no terminator.
///
/// A lone `\r` is not treated as a terminator; it stays inside the line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Lf,
    CrLf,
    None,
}

impl Ending {
    pub fn as_str(self) -> &'static str {
        match self {
            Ending::Lf => "\n",
            Ending::CrLf => "\r\n",
            Ending::None => "",
        }
    }
}

/// One line of a text buffer: content without its terminator, plus the
/// terminator it carried in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub ending: Ending,
}

/// Split `input` into lines, recording each line's own terminator.
///
/// `join_lines(&split_lines(s)) == s` for every input; nothing is normalized.
pub fn split_lines(input: &str) -> Vec<Line> {
    let mut out = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        match rest.find('\n') {
            Some(pos) => {
                let chunk = &rest[..pos];
                let line = match chunk.strip_suffix('\r') {
                    Some(body) => Line {
                        text: body.to_string(),
                        ending: Ending::CrLf,
                    },
                    None => Line {
                        text: chunk.to_string(),
                        ending: Ending::Lf,
                    },
                };
                out.push(line);
                rest = &rest[pos + 1..];
            }
            None => {
                out.push(Line {
                    text: rest.to_string(),
                    ending: Ending::None,
                });
                break;
            }
        }
    }
    out
}

/// Reassemble lines into a buffer, emitting each line's own terminator.
pub fn join_lines(lines: &[Line]) -> String {
    let cap: usize = lines.iter().map(|l| l.text.len() + 2).sum();
    let mut out = String::with_capacity(cap);
    for line in lines {
        out.push_str(&line.text);
        out.push_str(line.ending.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lf_round_trip() {
        let input = "a\nb\nc\n";
        let lines = split_lines(input);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.ending == Ending::Lf));
        assert_eq!(join_lines(&lines), input);
    }

    #[test]
    fn crlf_round_trip() {
        let input = "a\r\nb\r\n";
        let lines = split_lines(input);
        assert_eq!(lines[0].text, "a");
        assert!(lines.iter().all(|l| l.ending == Ending::CrLf));
        assert_eq!(join_lines(&lines), input);
    }

    #[test]
    fn mixed_endings_round_trip() {
        let input = "a\r\nb\nc\r\nd";
        let lines = split_lines(input);
        assert_eq!(
            lines.iter().map(|l| l.ending).collect::<Vec<_>>(),
            vec![Ending::CrLf, Ending::Lf, Ending::CrLf, Ending::None]
        );
        assert_eq!(join_lines(&lines), input);
    }

    #[test]
    fn missing_final_terminator_recorded() {
        let lines = split_lines("a\nb");
        assert_eq!(lines[1].text, "b");
        assert_eq!(lines[1].ending, Ending::None);
        assert_eq!(join_lines(&lines), "a\nb");
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(split_lines("").is_empty());
        assert_eq!(join_lines(&[]), "");
    }

    #[test]
    fn lone_cr_stays_in_line_text() {
        let input = "a\rb\nc\n";
        let lines = split_lines(input);
        assert_eq!(lines[0].text, "a\rb");
        assert_eq!(lines[0].ending, Ending::Lf);
        assert_eq!(join_lines(&lines), input);
    }

    #[test]
    fn trailing_cr_before_lf_is_crlf() {
        let lines = split_lines("a\r\r\n");
        assert_eq!(lines[0].text, "a\r");
        assert_eq!(lines[0].ending, Ending::CrLf);
        assert_eq!(join_lines(&lines), "a\r\r\n");
    }
}
