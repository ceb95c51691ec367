//! Line-based markdown parser
//!
//! A single forward pass over the document lines. Each paragraph kind is
//! recognised by the first line it starts on and then consumes as many lines
//! as it needs; the cursor never moves backwards.

use super::error::ParseError;
use super::line::{Line, LineKind, CODE_FENCE};
use super::paragraph::{Image, Paragraph};
use regex::Regex;
use std::sync::OnceLock;

/// Deepest heading level markdown knows about
const MAX_HEADING_LEVEL: usize = 6;

/// Parser state: the document lines and a read cursor
pub struct MarkdownParser {
    lines: Vec<Line>,
    pos: usize,
}

impl MarkdownParser {
    fn new(lines: Vec<Line>) -> Self {
        Self { lines, pos: 0 }
    }

    /// Parse markdown content into a paragraph sequence
    ///
    /// # Parameters
    /// * `content` - Raw markdown content to parse
    ///
    /// # Returns
    /// * `Ok(Vec<Paragraph>)` - Paragraphs in document order
    /// * `Err(ParseError)` - A heading or image line could not be parsed
    pub fn parse(content: &str) -> Result<Vec<Paragraph>, ParseError> {
        Self::new(Line::split(content)).parse_paragraphs()
    }

    fn parse_paragraphs(&mut self) -> Result<Vec<Paragraph>, ParseError> {
        let mut paragraphs = Vec::new();
        while let Some(line) = self.peek() {
            let paragraph = match line.kind() {
                LineKind::Empty => {
                    self.pos += 1;
                    continue;
                }
                LineKind::Heading => self.parse_heading()?,
                LineKind::Image => self.parse_image()?,
                LineKind::CodeFence => self.parse_code_block(),
                LineKind::MathFence => self.parse_math_block(),
                LineKind::Quote => self.parse_quote()?,
                LineKind::Normal => self.parse_normal_paragraph(),
            };
            paragraphs.push(paragraph);
        }
        Ok(paragraphs)
    }

    fn parse_heading(&mut self) -> Result<Paragraph, ParseError> {
        let line = self.consume();
        let malformed = || ParseError::MalformedHeading {
            line: line.number,
            text: line.text.clone(),
        };

        let level = line.text.chars().take_while(|&c| c == '#').count();
        if level > MAX_HEADING_LEVEL {
            return Err(malformed());
        }

        // `#` is one byte, so `level` is also a byte offset
        let rest = &line.text[level..];
        let text = if rest.is_empty() {
            ""
        } else {
            rest.strip_prefix(' ').ok_or_else(malformed)?
        };

        Ok(Paragraph::Heading {
            level,
            text: text.to_string(),
        })
    }

    /// Parse a line starting with `!`
    ///
    /// A line holding just `![caption](uri)` is an image. A well-formed image
    /// followed by plain text (`![fig](a.png) figure 1`) starts a normal
    /// paragraph so the text is kept verbatim. Broken image syntax, or a second
    /// image on the same line, is an error.
    fn parse_image(&mut self) -> Result<Paragraph, ParseError> {
        static IMAGE: OnceLock<Regex> = OnceLock::new();
        let pattern =
            IMAGE.get_or_init(|| Regex::new(r"^!\[(.*?)\]\(([^)]*)\)").expect("valid image regex"));

        let line = self.consume();
        let malformed = || ParseError::MalformedImage {
            line: line.number,
            text: line.text.clone(),
        };
        let captures = pattern.captures(&line.text).ok_or_else(malformed)?;

        let rest = &line.text[captures[0].len()..];
        if rest.trim().is_empty() {
            return Ok(Paragraph::Image(Image::new(&captures[1], &captures[2])));
        }
        if rest.contains("![") {
            return Err(malformed());
        }

        let mut lines = vec![line.text];
        lines.extend(
            self.consume_while(|line| line.kind() == LineKind::Normal)
                .into_iter()
                .map(|line| line.text),
        );
        Ok(Paragraph::Normal(lines))
    }

    fn parse_code_block(&mut self) -> Paragraph {
        let fence = self.consume();
        let language = fence.text[CODE_FENCE.len()..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();
        let lines = self.consume_fenced_body(LineKind::CodeFence);
        Paragraph::CodeBlock { language, lines }
    }

    fn parse_math_block(&mut self) -> Paragraph {
        self.consume();
        let lines = self.consume_fenced_body(LineKind::MathFence);
        Paragraph::MathBlock { lines }
    }

    /// Take every line up to the closing fence and step over the fence
    ///
    /// A block that is never closed runs to the end of the document.
    fn consume_fenced_body(&mut self, fence: LineKind) -> Vec<String> {
        let lines = self
            .consume_while(|line| line.kind() != fence)
            .into_iter()
            .map(|line| line.text)
            .collect();
        if self.peek().is_some() {
            self.consume();
        } else {
            log::warn!("Unclosed {:?} block at end of document", fence);
        }
        lines
    }

    fn parse_quote(&mut self) -> Result<Paragraph, ParseError> {
        let inner: Vec<Line> = self
            .consume_while(|line| line.kind() == LineKind::Quote)
            .into_iter()
            .map(Line::unquote)
            .collect();
        let paragraphs = Self::new(inner).parse_paragraphs()?;
        Ok(Paragraph::Quote(paragraphs))
    }

    fn parse_normal_paragraph(&mut self) -> Paragraph {
        let lines = self
            .consume_while(|line| line.kind() == LineKind::Normal)
            .into_iter()
            .map(|line| line.text)
            .collect();
        Paragraph::Normal(lines)
    }

    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    /// Take the current line; callers check `peek` first
    fn consume(&mut self) -> Line {
        let line = std::mem::replace(
            &mut self.lines[self.pos],
            Line {
                number: 0,
                text: String::new(),
            },
        );
        self.pos += 1;
        line
    }

    fn consume_while<F>(&mut self, predicate: F) -> Vec<Line>
    where
        F: Fn(&Line) -> bool,
    {
        let mut taken = Vec::new();
        while self.peek().is_some_and(&predicate) {
            taken.push(self.consume());
        }
        taken
    }
}
