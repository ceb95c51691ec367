//! Parsed markdown document and its mutations

use super::error::{DocumentError, ParseError};
use super::link::footnote_links;
use super::paragraph::{Image, Paragraph};
use super::parser::MarkdownParser;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Separator placed between rendered paragraphs
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A markdown document: an optional title plus the body paragraphs
///
/// The title is the text of a leading level-1 heading, which is then not part
/// of the body. Every other heading, including later level-1 ones, stays in
/// the body. A lone `#` is still a title heading, just an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownDoc {
    /// `None` when the document does not start with a level-1 heading
    title: Option<String>,
    body: Vec<Paragraph>,
}

impl MarkdownDoc {
    /// Parse a document from markdown text
    ///
    /// # Parameters
    /// * `content` - Raw markdown content
    ///
    /// # Returns
    /// * `Ok(MarkdownDoc)` - Parsed document with the title extracted
    /// * `Err(ParseError)` - A heading or image line is malformed
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut body = MarkdownParser::parse(content)?;

        let title = match body.first() {
            Some(Paragraph::Heading { level: 1, text }) => Some(text.clone()),
            _ => None,
        };
        if title.is_some() {
            body.remove(0);
        }
        Ok(Self { title, body })
    }

    /// Read and parse a markdown file
    pub fn from_file(path: &Path) -> Result<Self, DocumentReadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content)?)
    }

    /// Document title, empty when the document does not start with `# title`
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Body paragraphs in document order
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.body
    }

    /// Number of body paragraphs
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Render the body (without the title)
    ///
    /// Paragraphs are separated by exactly one blank line and the result ends
    /// with a newline. An empty body renders as an empty string.
    pub fn body(&self) -> String {
        if self.body.is_empty() {
            return String::new();
        }
        let mut output = self
            .body
            .iter()
            .map(Paragraph::to_string)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR);
        output.push('\n');
        output
    }

    /// One line per body paragraph describing its kind and content
    pub fn outline(&self) -> String {
        let mut output = format!("(title) {}\n", self.title());
        for paragraph in &self.body {
            output.push_str("[Paragraph]\n");
            output.push_str(&paragraph.describe());
            output.push('\n');
        }
        output
    }

    /// All images of the body, including those inside quotes
    pub fn images(&self) -> Vec<&Image> {
        fn collect<'a>(paragraphs: &'a [Paragraph], images: &mut Vec<&'a Image>) {
            for paragraph in paragraphs {
                match paragraph {
                    Paragraph::Image(image) => images.push(image),
                    Paragraph::Quote(inner) => collect(inner, images),
                    _ => {}
                }
            }
        }

        let mut images = Vec::new();
        collect(&self.body, &mut images);
        images
    }

    /// Insert a paragraph before the first body paragraph
    pub fn prepend_paragraph(&mut self, paragraph: Paragraph) {
        self.body.insert(0, paragraph);
    }

    /// Add a paragraph after the last body paragraph
    pub fn append_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(paragraph);
    }

    /// Insert a paragraph so that it ends up at position `index`
    ///
    /// # Parameters
    /// * `index` - Position in `0..=len`; `len` appends
    /// * `paragraph` - The paragraph to insert
    ///
    /// # Returns
    /// * `Ok(())` - Paragraph inserted
    /// * `Err(DocumentError::IndexOutOfRange)` - `index > len`, body unchanged
    pub fn insert_paragraph(
        &mut self,
        index: usize,
        paragraph: Paragraph,
    ) -> Result<(), DocumentError> {
        if index > self.body.len() {
            return Err(DocumentError::IndexOutOfRange {
                index,
                len: self.body.len(),
            });
        }
        self.body.insert(index, paragraph);
        Ok(())
    }

    /// Replace a trailing `\\` with `\newline` in every math block line
    ///
    /// Some MathJax setups only understand `\newline` as a line break.
    ///
    /// # Returns
    /// * `usize` - Number of lines changed
    pub fn transfer_math_equation_format(&mut self) -> usize {
        let count = self.for_each_paragraph_mut(|paragraph| match paragraph {
            Paragraph::MathBlock { lines } => lines
                .iter_mut()
                .filter_map(|line| {
                    let stripped = line.strip_suffix("\\\\")?;
                    *line = format!("{}\\newline", stripped);
                    Some(())
                })
                .count(),
            _ => 0,
        });
        log::info!("Transferred {} math equations", count);
        count
    }

    /// Point every local image at `base_url`
    ///
    /// A local image `img/fig.png` becomes `<base_url>/fig.png`; images that
    /// already use http(s) are left alone.
    ///
    /// # Returns
    /// * `usize` - Number of images rewritten
    pub fn transfer_image_url(&mut self, base_url: &str) -> usize {
        let base = base_url.trim_end_matches('/');
        let count = self.for_each_paragraph_mut(|paragraph| match paragraph {
            Paragraph::Image(image) if image.is_local() => {
                image.uri = format!("{}/{}", base, image.file_name());
                1
            }
            _ => 0,
        });
        log::info!("Transferred {} image urls", count);
        count
    }

    /// Give every inline text link a title so platforms can make footnotes
    ///
    /// # Returns
    /// * `usize` - Number of links rewritten
    pub fn transfer_link_to_footnote(&mut self) -> usize {
        let count = self.for_each_paragraph_mut(|paragraph| match paragraph {
            Paragraph::Normal(lines) => lines
                .iter_mut()
                .map(|line| {
                    let (rewritten, count) = footnote_links(line);
                    *line = rewritten;
                    count
                })
                .sum(),
            _ => 0,
        });
        log::info!("Transferred {} links to footnotes", count);
        count
    }

    /// Visit every paragraph, descending into quotes, and sum the results
    fn for_each_paragraph_mut<F>(&mut self, mut visit: F) -> usize
    where
        F: FnMut(&mut Paragraph) -> usize,
    {
        fn walk<F>(paragraphs: &mut [Paragraph], visit: &mut F) -> usize
        where
            F: FnMut(&mut Paragraph) -> usize,
        {
            let mut total = 0;
            for paragraph in paragraphs.iter_mut() {
                total += match paragraph {
                    Paragraph::Quote(inner) => walk(inner, visit),
                    other => visit(other),
                };
            }
            total
        }

        walk(&mut self.body, &mut visit)
    }
}

impl FromStr for MarkdownDoc {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Full document text: the title heading (if any) followed by the body
impl fmt::Display for MarkdownDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = &self.title {
            let heading = Paragraph::Heading {
                level: 1,
                text: title.clone(),
            };
            write!(f, "{}{}", heading, PARAGRAPH_SEPARATOR)?;
        }
        write!(f, "{}", self.body())
    }
}

/// Errors that can occur when reading a document from disk
#[derive(thiserror::Error, Debug)]
pub enum DocumentReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
