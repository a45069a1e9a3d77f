use regex::Regex;

use crate::lines::{join_lines, split_lines, Line};
use crate::PatchError;

/// An insertion point spanning two adjacent lines.
///
/// The anchor matches at line `i` when `first` matches line `i` and `second`
/// matches line `i + 1`; the block is spliced between the two.
#[derive(Debug)]
pub struct Anchor {
    first: Regex,
    second: Regex,
}

impl Anchor {
    pub fn new(first: &str, second: &str) -> Result<Anchor, PatchError> {
        Ok(Anchor {
            first: compile(first)?,
            second: compile(second)?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, PatchError> {
    Regex::new(pattern).map_err(|e| PatchError::new(format!("invalid pattern: {e}")))
}

/// Result of applying an anchored insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Full edited content as lines with their original terminators.
    pub lines: Vec<Line>,
    /// 1-based first line of each inserted block copy, in output numbering.
    pub inserted: Vec<usize>,
    /// 1-based input line numbers of anchor first lines skipped because the
    /// block already sits right after them.
    pub present: Vec<usize>,
}

impl InsertOutcome {
    pub fn text(&self) -> String {
        join_lines(&self.lines)
    }

    pub fn changed(&self) -> bool {
        !self.inserted.is_empty()
    }
}

/// Splice `block` between every adjacent line pair matched by `anchor`.
///
/// A location where the anchor's first line is already followed by the block
/// (with the second line right after it) counts as patched: it is skipped and
/// reported in `present`, so applying the same insertion twice cannot
/// duplicate it. Inserted lines adopt the terminator of the anchor's first
/// line; all other bytes of the input are untouched.
pub fn insert_block(input: &str, anchor: &Anchor, block: &[String]) -> InsertOutcome {
    let mut lines = split_lines(input);

    if block.is_empty() {
        return InsertOutcome {
            lines,
            inserted: Vec::new(),
            present: Vec::new(),
        };
    }

    let mut present = Vec::new();
    let mut insert_at = Vec::new();
    for i in 0..lines.len() {
        if !anchor.first.is_match(&lines[i].text) {
            continue;
        }
        // The patched shape (first line, block, second line) wins over a
        // fresh match, so a block whose first line happens to satisfy the
        // second pattern still cannot be inserted twice.
        if block_present_after(&lines, i, block)
            && anchor.second.is_match(&lines[i + 1 + block.len()].text)
        {
            present.push(i + 1);
        } else if i + 1 < lines.len() && anchor.second.is_match(&lines[i + 1].text) {
            insert_at.push(i);
        }
    }

    // Splice from the back so earlier indices stay valid.
    for &i in insert_at.iter().rev() {
        let ending = lines[i].ending;
        let new_lines: Vec<Line> = block
            .iter()
            .map(|t| Line {
                text: t.clone(),
                ending,
            })
            .collect();
        lines.splice(i + 1..i + 1, new_lines);
    }

    // Each earlier insertion shifts later block starts down by the block len.
    let inserted = insert_at
        .iter()
        .enumerate()
        .map(|(k, &i)| i + 2 + k * block.len())
        .collect();

    InsertOutcome {
        lines,
        inserted,
        present,
    }
}

/// True when `block` occupies the lines right after `i` and another line
/// exists beyond it (the anchor's second line in a patched file).
fn block_present_after(lines: &[Line], i: usize, block: &[String]) -> bool {
    let start = i + 1;
    if start + block.len() >= lines.len() {
        return false;
    }
    block
        .iter()
        .enumerate()
        .all(|(k, t)| lines[start + k].text == *t)
}
