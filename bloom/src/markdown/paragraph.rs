//! Block-level paragraph types
//!
//! A markdown document is a flat sequence of [`Paragraph`]s. Only quotes nest.

use super::line::{CODE_FENCE, MATH_FENCE};
use itertools::Itertools;
use std::fmt;

/// One structurally classified unit of a markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    /// A heading line (`## text`)
    Heading {
        /// Heading level (1 = h1, 2 = h2, etc.)
        level: usize,
        /// Heading text, possibly empty
        text: String,
    },

    /// A standalone image line
    Image(Image),

    /// A fenced code block
    CodeBlock {
        /// Language tag of the opening fence, empty when absent
        language: String,
        /// Lines between the fences
        lines: Vec<String>,
    },

    /// A `$$` fenced math block
    MathBlock {
        /// Lines between the fences
        lines: Vec<String>,
    },

    /// A block quote containing other paragraphs
    Quote(Vec<Paragraph>),

    /// A run of plain text lines
    Normal(Vec<String>),
}

impl Paragraph {
    /// Create a normal paragraph from anything that yields lines
    ///
    /// Used for injected content such as front matter and markers, which
    /// should be written out verbatim.
    pub fn normal<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Paragraph::Normal(lines.into_iter().map(Into::into).collect())
    }

    /// Render the paragraph as output lines
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            Paragraph::Heading { level, text } => {
                let hashes = "#".repeat(*level);
                if text.is_empty() {
                    vec![hashes]
                } else {
                    vec![format!("{} {}", hashes, text)]
                }
            }
            Paragraph::Image(image) => vec![image.to_string()],
            Paragraph::CodeBlock { language, lines } => {
                fenced(&format!("{}{}", CODE_FENCE, language), lines, CODE_FENCE)
            }
            Paragraph::MathBlock { lines } => fenced(MATH_FENCE, lines, MATH_FENCE),
            Paragraph::Quote(paragraphs) => {
                let nested = paragraphs.iter().map(Paragraph::to_lines);
                Itertools::intersperse(nested, vec![String::new()])
                    .flatten()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect()
            }
            Paragraph::Normal(lines) => lines.clone(),
        }
    }

    /// One-line description used by the outline view
    pub fn describe(&self) -> String {
        match self {
            Paragraph::Heading { level, text } => format!("(heading {}) {}", level, text),
            Paragraph::Image(image) => format!("(image) {}", image.caption),
            Paragraph::CodeBlock { language, lines } => format!(
                "(code block) language: {}, {} lines",
                language,
                lines.len()
            ),
            Paragraph::MathBlock { lines } => format!("(math block) {} lines", lines.len()),
            Paragraph::Quote(paragraphs) => format!("(quote) {} paragraphs", paragraphs.len()),
            Paragraph::Normal(lines) => lines.join("\n"),
        }
    }
}

fn fenced(open: &str, lines: &[String], close: &str) -> Vec<String> {
    std::iter::once(open.to_string())
        .chain(lines.iter().cloned())
        .chain(std::iter::once(close.to_string()))
        .collect()
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lines().join("\n"))
    }
}

/// An image reference (`![caption](uri)`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Alt text between the brackets
    pub caption: String,
    /// Relative path or absolute http(s) URL
    pub uri: String,
}

impl Image {
    pub fn new(caption: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            uri: uri.into(),
        }
    }

    /// Whether the image is already hosted somewhere
    pub fn is_online(&self) -> bool {
        self.uri.starts_with("http://") || self.uri.starts_with("https://")
    }

    /// Whether the image points at a file next to the document
    pub fn is_local(&self) -> bool {
        !self.is_online()
    }

    /// Last path segment of the uri (`img/fig 1.png` -> `fig 1.png`)
    pub fn file_name(&self) -> &str {
        self.uri
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.uri.as_str())
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "![{}]({})", self.caption, self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_rendering() {
        let heading = Paragraph::Heading {
            level: 3,
            text: "Details".to_string(),
        };
        assert_eq!(heading.to_string(), "### Details");

        let empty = Paragraph::Heading {
            level: 1,
            text: String::new(),
        };
        assert_eq!(empty.to_string(), "#");
    }

    #[test]
    fn test_code_block_rendering() {
        let block = Paragraph::CodeBlock {
            language: "go".to_string(),
            lines: vec!["fmt.Println(1)".to_string()],
        };
        assert_eq!(block.to_string(), "```go\nfmt.Println(1)\n```");

        let bare = Paragraph::CodeBlock {
            language: String::new(),
            lines: vec![],
        };
        assert_eq!(bare.to_string(), "```\n```");
    }

    #[test]
    fn test_math_block_rendering() {
        let block = Paragraph::MathBlock {
            lines: vec!["a = b".to_string(), "c = d".to_string()],
        };
        assert_eq!(block.to_string(), "$$\na = b\nc = d\n$$");
    }

    #[test]
    fn test_quote_rendering_separates_paragraphs() {
        let quote = Paragraph::Quote(vec![
            Paragraph::normal(["first line", "second line"]),
            Paragraph::Image(Image::new("fig", "img/fig.png")),
        ]);
        assert_eq!(
            quote.to_string(),
            "> first line\n> second line\n>\n> ![fig](img/fig.png)"
        );
    }

    #[test]
    fn test_nested_quote_rendering() {
        let quote = Paragraph::Quote(vec![Paragraph::Quote(vec![Paragraph::normal(["deep"])])]);
        assert_eq!(quote.to_string(), "> > deep");
    }

    #[test]
    fn test_image_locality() {
        assert!(Image::new("a", "img/local.png").is_local());
        assert!(Image::new("a", "http://x.com/y.png").is_online());
        assert!(Image::new("a", "https://x.com/y.png").is_online());
        assert!(Image::new("a", "ftp://x.com/y.png").is_local());
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(Image::new("", "img/sub/fig.png").file_name(), "fig.png");
        assert_eq!(Image::new("", "fig.png").file_name(), "fig.png");
        assert_eq!(Image::new("", "img\\fig.png").file_name(), "fig.png");
    }

    #[test]
    fn test_describe() {
        let block = Paragraph::CodeBlock {
            language: "rust".to_string(),
            lines: vec!["fn main() {}".to_string()],
        };
        assert_eq!(block.describe(), "(code block) language: rust, 1 lines");
        assert_eq!(
            Paragraph::Image(Image::new("caption", "a.png")).describe(),
            "(image) caption"
        );
    }
}
