//! Line-oriented view of a source file
//!
//! Lines are split on `\n` with one trailing `\r` removed, so CRLF files are
//! matched exactly like LF files. Line numbers are 1-based.

/// Source text split into physical lines
#[derive(Debug, Clone)]
pub struct SourceLines<'a> {
    content: &'a str,
    lines: Vec<&'a str>,
    offsets: Vec<usize>,
}

impl<'a> SourceLines<'a> {
    pub fn new(content: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut offsets = Vec::new();
        let mut offset = 0;

        for raw in content.split('\n') {
            offsets.push(offset);
            lines.push(raw.strip_suffix('\r').unwrap_or(raw));
            offset += raw.len() + 1;
        }

        Self {
            content,
            lines,
            offsets,
        }
    }

    /// Number of physical lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Text of a 1-based line
    pub fn get(&self, number: usize) -> Option<&'a str> {
        number.checked_sub(1).and_then(|i| self.lines.get(i).copied())
    }

    /// Iterate over every line with its position
    pub fn iter(&self) -> impl Iterator<Item = LineView<'a>> + '_ {
        self.lines
            .iter()
            .zip(self.offsets.iter())
            .enumerate()
            .map(|(i, (text, offset))| LineView {
                number: i + 1,
                text,
                offset: *offset,
                content: self.content,
            })
    }
}

/// One physical line plus access to a bounded window of its surroundings
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    /// 1-based line number
    pub number: usize,
    /// Line text without its terminator
    pub text: &'a str,
    offset: usize,
    content: &'a str,
}

impl<'a> LineView<'a> {
    /// Build a view over a single line with no surrounding document
    pub fn standalone(number: usize, text: &'a str) -> Self {
        Self {
            number,
            text,
            offset: 0,
            content: text,
        }
    }

    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Up to `len` bytes of the document starting at this line
    pub fn window_after(&self, len: usize) -> &'a str {
        let end = floor_char_boundary(self.content, self.offset.saturating_add(len));
        &self.content[self.offset..end]
    }

    /// Up to `len` bytes of the document ending where this line starts
    pub fn window_before(&self, len: usize) -> &'a str {
        let start = ceil_char_boundary(self.content, self.offset.saturating_sub(len));
        &self.content[start..self.offset]
    }

    /// Whether the line starts with one of the comment prefixes
    pub fn is_comment(&self, prefixes: &[&str]) -> bool {
        let trimmed = self.text.trim_start();
        prefixes.iter().any(|p| trimmed.starts_with(p))
    }

    /// Whether the line ends in a space or tab
    pub fn has_trailing_whitespace(&self) -> bool {
        self.text.ends_with(' ') || self.text.ends_with('\t')
    }
}

/// Leading whitespace of a line
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
