//! Rewrite plan structures

use regex::Regex;

/// A single line-level change proposed for one issue
///
/// Line numbers always refer to the file as it was read, before any
/// insertion; replacements never change the line count.
#[derive(Debug, Clone)]
pub enum Rewrite {
    /// Replace the text of a line
    Replace { line: usize, text: String },
    /// Insert lines immediately before a line
    InsertBefore { line: usize, lines: Vec<String> },
    /// Insert lines immediately after a line
    InsertAfter { line: usize, lines: Vec<String> },
    /// Add lines at the top of the document unless `guard` already matches it
    Prepend {
        lines: Vec<String>,
        guard: &'static Regex,
    },
}

impl Rewrite {
    /// Create a replacement
    pub fn replace(line: usize, text: impl Into<String>) -> Self {
        Self::Replace {
            line,
            text: text.into(),
        }
    }

    /// Create a single-line insertion after `line`
    pub fn insert_after(line: usize, text: impl Into<String>) -> Self {
        Self::InsertAfter {
            line,
            lines: vec![text.into()],
        }
    }

    /// Whether the rewrite changes the number of lines
    pub fn is_insertion(&self) -> bool {
        !matches!(self, Self::Replace { .. })
    }
}

/// Side of the anchor line an insertion lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Side {
    After,
    Before,
}

/// An insertion waiting for the bottom-up pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingInsert {
    pub anchor: usize,
    pub side: Side,
    pub seq: usize,
    pub lines: Vec<String>,
}

/// Insertions collected during one pass over a file's issues
#[derive(Debug, Default)]
pub(crate) struct InsertQueue {
    pending: Vec<PendingInsert>,
}

impl InsertQueue {
    /// Queue an insertion; an identical insertion at the same place is dropped
    pub fn push(&mut self, anchor: usize, side: Side, lines: Vec<String>) {
        let duplicate = self
            .pending
            .iter()
            .any(|p| p.anchor == anchor && p.side == side && p.lines == lines);
        if duplicate || lines.is_empty() {
            return;
        }
        let seq = self.pending.len();
        self.pending.push(PendingInsert {
            anchor,
            side,
            seq,
            lines,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Splice every queued insertion into `lines`.
    ///
    /// Anchors are processed from the bottom of the file up so earlier anchors
    /// stay valid. At one anchor, text after the line goes in before text in
    /// front of it, and insertions on the same side keep the order they were
    /// queued in.
    pub fn apply(mut self, lines: &mut Vec<String>) {
        self.pending.sort_by(|a, b| {
            b.anchor
                .cmp(&a.anchor)
                .then(a.side.cmp(&b.side))
                .then(b.seq.cmp(&a.seq))
        });

        for insert in self.pending {
            if insert.anchor == 0 || insert.anchor > lines.len() {
                continue;
            }
            let index = match insert.side {
                Side::After => insert.anchor,
                Side::Before => insert.anchor - 1,
            };
            lines.splice(index..index, insert.lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_insertions_apply_bottom_up() {
        let mut doc = lines(&["a", "b", "c"]);
        let mut queue = InsertQueue::default();
        queue.push(1, Side::After, lines(&["after a"]));
        queue.push(3, Side::Before, lines(&["before c"]));
        queue.push(3, Side::After, lines(&["after c"]));
        queue.apply(&mut doc);

        assert_eq!(
            doc,
            lines(&["a", "after a", "b", "before c", "c", "after c"])
        );
    }

    #[test]
    fn test_same_anchor_keeps_detection_order() {
        let mut doc = lines(&["x"]);
        let mut queue = InsertQueue::default();
        queue.push(1, Side::After, lines(&["first"]));
        queue.push(1, Side::After, lines(&["second"]));
        queue.push(1, Side::Before, lines(&["third"]));
        queue.push(1, Side::Before, lines(&["fourth"]));
        queue.apply(&mut doc);

        assert_eq!(doc, lines(&["third", "fourth", "x", "first", "second"]));
    }

    #[test]
    fn test_duplicate_insertions_dropped() {
        let mut doc = lines(&["x", "y"]);
        let mut queue = InsertQueue::default();
        queue.push(1, Side::After, lines(&["commit()"]));
        queue.push(1, Side::After, lines(&["commit()"]));
        queue.apply(&mut doc);
        assert_eq!(doc, lines(&["x", "commit()", "y"]));
    }

    #[test]
    fn test_out_of_range_anchor_ignored() {
        let mut doc = lines(&["x"]);
        let mut queue = InsertQueue::default();
        queue.push(5, Side::After, lines(&["late"]));
        queue.push(0, Side::Before, lines(&["early"]));
        queue.apply(&mut doc);
        assert_eq!(doc, lines(&["x"]));
    }

    #[test]
    fn test_rewrite_helpers() {
        assert!(!Rewrite::replace(1, "x").is_insertion());
        assert!(Rewrite::insert_after(1, "y").is_insertion());
    }
}
