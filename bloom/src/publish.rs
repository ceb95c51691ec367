//! Publishing pipeline: per-platform rewrites of a document and where it goes
//!
//! Each platform is a [`Publisher`]: a fixed list of transfers applied to the
//! article's document in order, followed by one save action.

use crate::article::{Article, ArticleError};
use crate::clipboard::{self, ClipboardError};
use crate::markdown::{DocumentError, MarkdownDoc, Paragraph};
use crate::settings::{Settings, SettingsError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Marker hexo uses to cut the excerpt shown on the index page
pub const READ_MORE_MARKER: &str = "<!-- more -->";

/// Errors that can occur while publishing
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Unknown platform `{}' (expected one of: {})", .0, Platform::NAMES.join(", "))]
    UnknownPlatform(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Article(#[from] ArticleError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A publishing destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Xzl,
    Juejin,
    Wechat,
    Zhihu,
    Hexo,
}

impl Platform {
    /// Names accepted on the command line
    pub const NAMES: &'static [&'static str] = &["xzl", "juejin", "wechat", "zhihu", "hexo"];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Xzl => "xzl",
            Platform::Juejin => "juejin",
            Platform::Wechat => "wechat",
            Platform::Zhihu => "zhihu",
            Platform::Hexo => "hexo",
        }
    }

    /// The transfers and save action of this platform
    pub fn publisher(self) -> Publisher {
        match self {
            Platform::Xzl | Platform::Juejin => Publisher {
                transfers: IMAGE_URL_ONLY,
                save: save_to_clipboard,
            },
            Platform::Zhihu => Publisher {
                transfers: IMAGE_URL_ONLY,
                save: save_to_temp_file,
            },
            Platform::Wechat => Publisher {
                transfers: WECHAT_TRANSFERS,
                save: save_to_clipboard,
            },
            Platform::Hexo => Publisher {
                transfers: HEXO_TRANSFERS,
                save: save_to_hexo,
            },
        }
    }
}

impl FromStr for Platform {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xzl" => Ok(Platform::Xzl),
            "juejin" => Ok(Platform::Juejin),
            "wechat" => Ok(Platform::Wechat),
            "zhihu" => Ok(Platform::Zhihu),
            "hexo" => Ok(Platform::Hexo),
            _ => Err(PublishError::UnknownPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a transfer or save action may look at
#[derive(Debug, Clone, Copy)]
pub struct PublishContext<'a> {
    pub article: &'a Article,
    pub settings: &'a Settings,
}

/// Rewrites a document for a platform
pub type Transfer = fn(&PublishContext<'_>, MarkdownDoc) -> Result<MarkdownDoc, PublishError>;

/// Delivers the final document
pub type Save = fn(&PublishContext<'_>, &MarkdownDoc) -> Result<Destination, PublishError>;

const IMAGE_URL_ONLY: &[Transfer] = &[transfer_image_url];
const WECHAT_TRANSFERS: &[Transfer] = &[transfer_image_url, transfer_link_to_footnote];
const HEXO_TRANSFERS: &[Transfer] = &[
    transfer_math_equation_format,
    transfer_read_more,
    transfer_hexo_header,
];

/// Transfers and save action of one platform
#[derive(Clone, Copy)]
pub struct Publisher {
    pub transfers: &'static [Transfer],
    pub save: Save,
}

impl Publisher {
    /// Apply every transfer in order
    pub fn prepare(
        &self,
        context: &PublishContext<'_>,
        doc: MarkdownDoc,
    ) -> Result<MarkdownDoc, PublishError> {
        self.transfers
            .iter()
            .try_fold(doc, |doc, transfer| transfer(context, doc))
    }

    /// Apply the transfers and save the result
    pub fn publish(
        &self,
        context: &PublishContext<'_>,
        doc: MarkdownDoc,
    ) -> Result<Destination, PublishError> {
        let doc = self.prepare(context, doc)?;
        (self.save)(context, &doc)
    }
}

/// Where a published document ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Clipboard,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Clipboard => f.write_str("clipboard"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Publish an article's document to `platform`
///
/// # Parameters
/// * `platform` - Target platform
/// * `article` - The article to publish
/// * `settings` - User settings (image base url, hexo project, temp dir)
///
/// # Returns
/// * `Ok(Destination)` - Where the document was written
/// * `Err(PublishError)` - Missing settings, unreadable document, or a failed save
pub fn publish(
    platform: Platform,
    article: &Article,
    settings: &Settings,
) -> Result<Destination, PublishError> {
    log::info!(
        "Publishing {} to {}",
        article.meta().base.name,
        platform
    );
    let doc = article.read_doc()?;
    let context = PublishContext { article, settings };
    platform.publisher().publish(&context, doc)
}

fn transfer_image_url(
    context: &PublishContext<'_>,
    mut doc: MarkdownDoc,
) -> Result<MarkdownDoc, PublishError> {
    let base_url = format!(
        "{}/{}",
        context.settings.image_base_url()?.trim_end_matches('/'),
        context.article.meta().base.name
    );
    doc.transfer_image_url(&base_url);
    Ok(doc)
}

fn transfer_math_equation_format(
    _context: &PublishContext<'_>,
    mut doc: MarkdownDoc,
) -> Result<MarkdownDoc, PublishError> {
    doc.transfer_math_equation_format();
    Ok(doc)
}

fn transfer_link_to_footnote(
    _context: &PublishContext<'_>,
    mut doc: MarkdownDoc,
) -> Result<MarkdownDoc, PublishError> {
    doc.transfer_link_to_footnote();
    Ok(doc)
}

/// Insert the read-more marker before body paragraph `readMore`
fn transfer_read_more(
    context: &PublishContext<'_>,
    mut doc: MarkdownDoc,
) -> Result<MarkdownDoc, PublishError> {
    let index = context.article.meta().hexo.read_more;
    if index == 0 || doc.len() <= index {
        log::debug!("No read-more marker for {} paragraphs", doc.len());
        return Ok(doc);
    }
    doc.insert_paragraph(index, Paragraph::normal([READ_MORE_MARKER]))?;
    Ok(doc)
}

/// Prepend hexo front matter
fn transfer_hexo_header(
    context: &PublishContext<'_>,
    mut doc: MarkdownDoc,
) -> Result<MarkdownDoc, PublishError> {
    let header = hexo_header(context.article, doc.title());
    doc.prepend_paragraph(header);
    Ok(doc)
}

fn hexo_header(article: &Article, title: &str) -> Paragraph {
    let base = &article.meta().base;
    Paragraph::normal([
        format!("title: '{}'", title.replace('\'', "''")),
        format!("date: {}", base.create_time.format("%Y-%m-%d %H:%M:%S")),
        format!("tags: [{}]", base.tags.join(", ")),
        "---".to_string(),
    ])
}

fn save_to_clipboard(
    _context: &PublishContext<'_>,
    doc: &MarkdownDoc,
) -> Result<Destination, PublishError> {
    clipboard::copy(&doc.body())?;
    Ok(Destination::Clipboard)
}

/// Write the body to `<temp_dir>/<docName>`
fn save_to_temp_file(
    context: &PublishContext<'_>,
    doc: &MarkdownDoc,
) -> Result<Destination, PublishError> {
    let temp_dir = context.settings.temp_dir();
    create_dir(&temp_dir)?;
    let path = temp_dir.join(&context.article.meta().base.doc_name);
    write_file(&path, &doc.body())?;
    Ok(Destination::File(path))
}

/// Write the post into the hexo project and copy its images next to it
fn save_to_hexo(
    context: &PublishContext<'_>,
    doc: &MarkdownDoc,
) -> Result<Destination, PublishError> {
    let name = &context.article.meta().base.name;
    let posts_dir = context
        .settings
        .hexo_project()?
        .join("source")
        .join("_posts");
    create_dir(&posts_dir)?;

    let post_path = posts_dir.join(format!("{}.md", name));
    write_file(&post_path, &doc.body())?;

    let images = context.article.image_files()?;
    if !images.is_empty() {
        let asset_dir = posts_dir.join(name);
        create_dir(&asset_dir)?;
        for image in &images {
            let Some(file_name) = image.file_name() else {
                continue;
            };
            let target = asset_dir.join(file_name);
            fs::copy(image, &target).map_err(|e| PublishError::Io {
                path: target.clone(),
                source: e,
            })?;
        }
        log::info!("Copied {} images to {}", images.len(), asset_dir.display());
    }

    Ok(Destination::File(post_path))
}

fn create_dir(path: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(path).map_err(|e| PublishError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), PublishError> {
    fs::write(path, content).map_err(|e| PublishError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
