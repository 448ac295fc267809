//! Tag scanner splitting rules text into literal spans, tags and overrides.

use crate::errors::{ExpandError, malformed};
use crate::tag::TagFamily;

/// Controls which `@name[` sequences open a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanMode {
    /// Every `@name[` opens a tag; unknown names fail later in the renderer.
    TopLevel,
    /// Only known families open a nested tag. Other references, such as
    /// `@item.level[...]`, stay in the body for the expression evaluator.
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Tag(TagSpan<'a>),
    /// Brace block directly after the preceding tag.
    Override(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagSpan<'a> {
    pub name: &'a str,
    pub body: &'a str,
    /// Full `@name[body]` text.
    pub source: &'a str,
    /// Absolute offset of the `@`.
    pub start: usize,
    /// Absolute offset of the first body byte.
    pub body_start: usize,
}

/// Forward-only scanner over one text block (or one tag body).
///
/// Offsets reported in segments and errors are absolute: `base` is added to
/// every position so nested bodies report offsets into the outermost text.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
    mode: ScanMode,
    after_tag: bool,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub(crate) const fn new(src: &'a str, base: usize, mode: ScanMode) -> Self {
        Self {
            src,
            pos: 0,
            base,
            mode,
            after_tag: false,
            failed: false,
        }
    }

    fn byte(&self, index: usize) -> Option<u8> {
        self.src.as_bytes().get(index).copied()
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.src.get(start..end).unwrap_or_default()
    }

    /// Position of the `[` ending the name token after the `@` at `at`, if
    /// this `@` opens a tag in the current mode.
    fn tag_opening(&self, at: usize) -> Option<usize> {
        let mut index = at + 1;
        while self
            .byte(index)
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'.')
        {
            index += 1;
        }
        if index == at + 1 || self.byte(index) != Some(b'[') {
            return None;
        }
        match self.mode {
            ScanMode::TopLevel => Some(index),
            ScanMode::Body => {
                TagFamily::from_name(self.slice(at + 1, index)).map(|_| index)
            }
        }
    }

    fn find_tag_start(&self, from: usize) -> Option<(usize, usize)> {
        let rest = self.src.get(from..)?;
        rest.match_indices('@')
            .map(|(rel, _)| from + rel)
            .find_map(|at| self.tag_opening(at).map(|open| (at, open)))
    }

    fn scan_tag(&mut self, at: usize, open: usize) -> Result<Segment<'a>, ExpandError> {
        let Some(close) = find_closing_bracket(self.src.as_bytes(), open) else {
            self.failed = true;
            return Err(malformed("unterminated tag", self.base + at));
        };
        self.pos = close + 1;
        self.after_tag = true;
        Ok(Segment::Tag(TagSpan {
            name: self.slice(at + 1, open),
            body: self.slice(open + 1, close),
            source: self.slice(at, close + 1),
            start: self.base + at,
            body_start: self.base + open + 1,
        }))
    }

    fn scan_override(&mut self) -> Result<Segment<'a>, ExpandError> {
        let at = self.pos;
        let Some(len) = self.src.get(at + 1..).and_then(|rest| rest.find('}')) else {
            self.failed = true;
            return Err(malformed("unterminated override", self.base + at));
        };
        self.pos = at + 1 + len + 1;
        Ok(Segment::Override(self.slice(at + 1, at + 1 + len)))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Segment<'a>, ExpandError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.src.len() {
            return None;
        }
        if std::mem::take(&mut self.after_tag) && self.byte(self.pos) == Some(b'{') {
            return Some(self.scan_override());
        }
        let start = self.pos;
        match self.find_tag_start(start) {
            Some((at, open)) if at == start => Some(self.scan_tag(at, open)),
            Some((at, _)) => {
                self.pos = at;
                Some(Ok(Segment::Text(self.slice(start, at))))
            }
            None => {
                self.pos = self.src.len();
                Some(Ok(Segment::Text(self.slice(start, self.src.len()))))
            }
        }
    }
}

/// Index of the `]` that returns bracket depth to zero, counting from the
/// `[` at `open`.
fn find_closing_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut index = open;
    while let Some(&b) = bytes.get(index) {
        match b {
            b'[' => depth = depth.saturating_add(1),
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}
