//! Error types for markdown parsing and document mutation

use thiserror::Error;

/// Errors that can occur while parsing a markdown document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line starting with `#` that is not a well-formed heading
    #[error("Invalid heading at line {line}: `{text}'")]
    MalformedHeading {
        /// 1-based line number in the source document
        line: usize,
        /// The offending line
        text: String,
    },

    /// A line starting with `!` that is not a well-formed image
    #[error("Invalid image at line {line}: `{text}'")]
    MalformedImage {
        /// 1-based line number in the source document
        line: usize,
        /// The offending line
        text: String,
    },
}

impl ParseError {
    /// Line number the error points at
    pub fn line(&self) -> usize {
        match self {
            ParseError::MalformedHeading { line, .. } | ParseError::MalformedImage { line, .. } => {
                *line
            }
        }
    }
}

/// Errors that can occur while mutating a parsed document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Paragraph index outside `0..=len`
    #[error("Invalid paragraph index {index} (document has {len} paragraphs)")]
    IndexOutOfRange { index: usize, len: usize },
}
