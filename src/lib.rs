//! anchorpatch — Anchored Text Patcher
//!
//! This crate provides line-structured patching primitives for the
//! `anchorins` and `regionsub` CLIs: block insertion after a two-line
//! regex anchor, and substring rewriting scoped to a marker-gated region.

mod fsio;
mod insert;
mod lines;
mod parse;
mod rewrite;

pub use fsio::{read_text, write_atomic};
pub use insert::{insert_block, Anchor, InsertOutcome};
pub use lines::{join_lines, split_lines, Ending, Line};
pub use parse::{parse_rule, parse_rules_from_args, read_block_from_bufread, Rule};
pub use rewrite::{rewrite_lines, RewriteOutcome, RuleSet};

#[derive(Debug, Clone)]
pub struct PatchError {
    msg: String,
}

impl PatchError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for PatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for PatchError {}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn insert_after_anchor_pair() {
        let anchor = Anchor::new(r"^fn main", r"^\}").unwrap();
        let out = insert_block("fn main() {\n}\n", &anchor, &["    body();".to_string()]);
        assert_eq!(out.text(), "fn main() {\n    body();\n}\n");
        assert_eq!(out.inserted, vec![2]);
    }

    #[test]
    fn rewrite_inside_region_only() {
        let rules = RuleSet {
            start: "BEGIN".to_string(),
            end: None,
            rules: vec![parse_rule("s/x/y/").unwrap()],
        };
        let out = rewrite_lines("x\nBEGIN\nx\n", &rules);
        assert_eq!(out.text(), "x\nBEGIN\ny\n");
        assert_eq!(out.region_start, Some(2));
        assert_eq!(out.modified, vec![3]);
    }

    #[test]
    fn line_round_trip_is_byte_exact() {
        let input = "a\r\nb\nc";
        assert_eq!(join_lines(&split_lines(input)), input);
    }

    #[test]
    fn rule_syntax_round_trip() {
        match parse_rule(r"n/mark/old/new/").unwrap() {
            Rule::SubNext { marker, find, replace } => {
                assert_eq!(marker, "mark");
                assert_eq!(find, "old");
                assert_eq!(replace, "new");
            }
            other => panic!("unexpected rule: {other:?}"),
        }
    }
}
