//! Line classification
//!
//! Every raw line belongs to exactly one [`LineKind`]. The prefix tests run in
//! a fixed order, so a line is classified by the first test that matches.

pub(super) const CODE_FENCE: &str = "```";
pub(super) const MATH_FENCE: &str = "$$";

/// Category of a single raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Blank line (paragraph separator)
    Empty,
    /// Starts with `#`
    Heading,
    /// Starts with `!`
    Image,
    /// Starts with ```` ``` ````
    CodeFence,
    /// Starts with `$$`
    MathFence,
    /// Starts with `>`
    Quote,
    /// Anything else
    Normal,
}

impl LineKind {
    /// Classify a line (without its trailing newline)
    pub fn classify(text: &str) -> Self {
        if text.is_empty() {
            LineKind::Empty
        } else if text.starts_with('#') {
            LineKind::Heading
        } else if text.starts_with('!') {
            LineKind::Image
        } else if text.starts_with(CODE_FENCE) {
            LineKind::CodeFence
        } else if text.starts_with(MATH_FENCE) {
            LineKind::MathFence
        } else if text.starts_with('>') {
            LineKind::Quote
        } else {
            LineKind::Normal
        }
    }
}

/// A source line together with its 1-based position in the original document
///
/// Quote contents are re-parsed from stripped lines; keeping the original
/// number lets parse errors point at the right place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn kind(&self) -> LineKind {
        LineKind::classify(&self.text)
    }

    /// Split document content into numbered lines
    ///
    /// `str::lines` also drops the `\r` of CRLF line endings.
    pub fn split(content: &str) -> Vec<Line> {
        content
            .lines()
            .enumerate()
            .map(|(i, text)| Line {
                number: i + 1,
                text: text.to_string(),
            })
            .collect()
    }

    /// Remove one leading `>` and at most one space after it
    pub fn unquote(self) -> Line {
        let text = match self.text.strip_prefix('>') {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).to_string(),
            None => self.text,
        };
        Line {
            number: self.number,
            text,
        }
    }
}
