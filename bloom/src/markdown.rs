//! Markdown document model
//!
//! A small line-based reading of markdown that is just detailed enough to
//! rewrite articles for publishing: headings, standalone images, fenced code
//! and math blocks, quotes and plain paragraphs. Everything is kept as text, so
//! serializing a parsed document gives back the original modulo blank lines.

// Submodules
mod document;
mod error;
mod line;
mod link;
mod paragraph;
mod parser;

// Re-export public types
pub use document::{DocumentReadError, MarkdownDoc};
pub use error::{DocumentError, ParseError};
pub use paragraph::{Image, Paragraph};
