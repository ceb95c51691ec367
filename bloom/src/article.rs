//! Article directories: `meta.toml`, the markdown document and `img/`

use crate::markdown::{DocumentReadError, MarkdownDoc};
use crate::meta::{MetaError, MetaInfo, META_FILE_NAME};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the image directory inside every article directory
pub const IMAGE_DIR_NAME: &str = "img";

/// An article directory together with its metadata
#[derive(Debug, Clone)]
pub struct Article {
    path: PathBuf,
    meta: MetaInfo,
}

impl Article {
    /// Open an existing article directory
    ///
    /// # Parameters
    /// * `path` - Directory containing a meta.toml file
    ///
    /// # Returns
    /// * `Ok(Article)` - Article with its metadata loaded
    /// * `Err(ArticleError)` - The directory does not exist or meta.toml cannot be loaded
    pub fn open(path: &Path) -> Result<Self, ArticleError> {
        if !path.is_dir() {
            return Err(ArticleError::NotFound(path.to_path_buf()));
        }
        let meta_path = path.join(META_FILE_NAME);
        let meta = MetaInfo::load(&meta_path).map_err(|e| ArticleError::Meta {
            path: meta_path,
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            meta,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta(&self) -> &MetaInfo {
        &self.meta
    }

    pub fn meta_path(&self) -> PathBuf {
        self.path.join(META_FILE_NAME)
    }

    /// Path of the markdown document named by `docName`
    pub fn doc_path(&self) -> PathBuf {
        self.path.join(&self.meta.base.doc_name)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.path.join(IMAGE_DIR_NAME)
    }

    /// Resolve a path relative to the article directory
    pub fn path_to(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Read and parse the article's markdown document
    pub fn read_doc(&self) -> Result<MarkdownDoc, ArticleError> {
        if self.meta.base.doc_name.is_empty() {
            return Err(ArticleError::EmptyDocName(self.meta_path()));
        }
        let doc_path = self.doc_path();
        MarkdownDoc::from_file(&doc_path).map_err(|e| ArticleError::Document {
            path: doc_path,
            source: e,
        })
    }

    pub fn save_meta(&self) -> Result<(), ArticleError> {
        let meta_path = self.meta_path();
        self.meta.save(&meta_path).map_err(|e| ArticleError::Meta {
            path: meta_path,
            source: e,
        })
    }

    /// Bring meta.toml in line with the document
    ///
    /// When `docName` does not name an existing file, the only markdown file
    /// of the directory takes its place. The Chinese title is taken from the
    /// document's `# title` line.
    pub fn update(&mut self) -> Result<(), ArticleError> {
        let doc_name = &self.meta.base.doc_name;
        if doc_name.is_empty() || !self.doc_path().is_file() {
            let found = self.single_markdown_file()?;
            log::info!(
                "docName `{}' not found, using `{}' instead",
                doc_name,
                found
            );
            self.meta.base.doc_name = found;
        }

        let doc = self.read_doc()?;
        self.meta.base.title_cn = doc.title().to_string();
        self.save_meta()
    }

    /// Markdown files directly inside the article directory, sorted by name
    pub fn find_markdown_files(&self) -> Result<Vec<String>, ArticleError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ArticleError::Io {
                path: self.path.clone(),
                source: e.into(),
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("md")
            {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(files)
    }

    fn single_markdown_file(&self) -> Result<String, ArticleError> {
        let mut files = self.find_markdown_files()?;
        match files.len() {
            0 => Err(ArticleError::NoMarkdownFile(self.path.clone())),
            1 => Ok(files.remove(0)),
            _ => Err(ArticleError::TooManyMarkdownFiles {
                dir: self.path.clone(),
                files,
            }),
        }
    }

    /// Regular, non-hidden files of `img/`, sorted by name
    ///
    /// A missing image directory yields no files.
    pub fn image_files(&self) -> Result<Vec<PathBuf>, ArticleError> {
        let image_dir = self.image_dir();
        if !image_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&image_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ArticleError::Io {
                path: image_dir.clone(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() && !entry.file_name().to_string_lossy().starts_with('.')
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Resolve a command line article path
///
/// The path is used as given when it exists; otherwise it is looked up inside
/// the store.
pub fn resolve_path(path: &Path, store: Option<&Path>) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    match store {
        Some(store) if store.join(path).exists() => store.join(path),
        _ => path.to_path_buf(),
    }
}

/// URL-friendly slug of an English title
///
/// `"From tree traversal to backtracking"` becomes
/// `"from-tree-traversal-to-backtracking"`.
pub fn article_name(title_en: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let splitter =
        NON_ALNUM.get_or_init(|| Regex::new(r"[^0-9A-Za-z]+").expect("valid name regex"));
    splitter
        .split(title_en)
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Directory name of an article: the Chinese title with whitespace runs turned into `-`
pub fn doc_name_bare(title_cn: &str) -> String {
    title_cn.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Create a new article directory under `parent`
///
/// Creates `<parent>/<doc name>/` containing the document (holding just the
/// `# title` line), meta.toml and an empty img/ directory.
///
/// # Parameters
/// * `parent` - Directory to create the article in, usually the store
/// * `title_en` - English title, used for the article name
/// * `title_cn` - Chinese title, used for the directory and document names
///
/// # Returns
/// * `Ok(Article)` - The newly created article
/// * `Err(ArticleError)` - Invalid titles, an existing directory, or an I/O failure
pub fn create(parent: &Path, title_en: &str, title_cn: &str) -> Result<Article, ArticleError> {
    let name = article_name(title_en);
    if name.is_empty() {
        return Err(ArticleError::InvalidTitle(title_en.to_string()));
    }
    let bare = doc_name_bare(title_cn);
    if bare.is_empty() {
        return Err(ArticleError::InvalidTitle(title_cn.to_string()));
    }
    let doc_name = format!("{}.md", bare);

    let path = parent.join(&bare);
    if path.exists() {
        return Err(ArticleError::AlreadyExists(path));
    }
    log::info!("Creating article {} in {}", name, path.display());

    fs::create_dir_all(&path).map_err(io_error(&path))?;

    let doc_path = path.join(&doc_name);
    fs::write(&doc_path, format!("# {}\n", title_cn.trim())).map_err(io_error(&doc_path))?;

    let image_dir = path.join(IMAGE_DIR_NAME);
    fs::create_dir(&image_dir).map_err(io_error(&image_dir))?;

    let article = Article {
        path,
        meta: MetaInfo::new(
            name,
            doc_name,
            title_en.trim().to_string(),
            title_cn.trim().to_string(),
        ),
    };
    article.save_meta()?;
    Ok(article)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArticleError {
    let path = path.to_path_buf();
    move |source| ArticleError::Io { path, source }
}

/// Errors that can occur when working with article directories
#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("Article not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Article already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Title `{0}' does not yield a usable name")]
    InvalidTitle(String),

    #[error("Failed to access metadata {}: {source}", .path.display())]
    Meta {
        path: PathBuf,
        #[source]
        source: MetaError,
    },

    #[error("docName is empty in {}", .0.display())]
    EmptyDocName(PathBuf),

    #[error("No markdown file found in {}", .0.display())]
    NoMarkdownFile(PathBuf),

    #[error("More than one markdown file in {}: {}", .dir.display(), .files.join(", "))]
    TooManyMarkdownFiles { dir: PathBuf, files: Vec<String> },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read document {}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentReadError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_name() {
        assert_eq!(
            article_name("From tree traversal to backtracking"),
            "from-tree-traversal-to-backtracking"
        );
        assert_eq!(article_name("  C++ & Rust: 2 ways!  "), "c-rust-2-ways");
        assert_eq!(article_name("你好"), "");
    }

    #[test]
    fn test_doc_name_bare() {
        assert_eq!(doc_name_bare("从二叉树遍历 到 回溯算法"), "从二叉树遍历-到-回溯算法");
        assert_eq!(doc_name_bare(" 回溯\t算法 "), "回溯-算法");
    }

    #[test]
    fn test_create_article() {
        // Arrange
        let store = tempfile::tempdir().unwrap();

        // Act
        let article = create(store.path(), "Backtracking Basics", "回溯 基础").unwrap();

        // Assert
        let dir = store.path().join("回溯-基础");
        assert_eq!(article.path(), dir);
        assert!(dir.join("img").is_dir());
        assert_eq!(
            fs::read_to_string(dir.join("回溯-基础.md")).unwrap(),
            "# 回溯 基础\n"
        );

        let reopened = Article::open(&dir).unwrap();
        assert_eq!(reopened.meta().base.name, "backtracking-basics");
        assert_eq!(reopened.meta().base.doc_name, "回溯-基础.md");
        assert_eq!(reopened.meta().base.title_en, "Backtracking Basics");
        assert_eq!(reopened.read_doc().unwrap().title(), "回溯 基础");
    }

    #[test]
    fn test_create_refuses_existing_directory() {
        let store = tempfile::tempdir().unwrap();
        create(store.path(), "One", "一").unwrap();

        let result = create(store.path(), "One again", "一");

        assert!(matches!(result, Err(ArticleError::AlreadyExists(_))));
    }

    #[test]
    fn test_create_rejects_unusable_title() {
        let store = tempfile::tempdir().unwrap();
        let result = create(store.path(), "!!!", "标题");
        assert!(matches!(result, Err(ArticleError::InvalidTitle(_))));
    }

    #[test]
    fn test_open_missing_article() {
        let store = tempfile::tempdir().unwrap();
        let result = Article::open(&store.path().join("nope"));
        assert!(matches!(result, Err(ArticleError::NotFound(_))));
    }

    #[test]
    fn test_update_syncs_title() {
        let store = tempfile::tempdir().unwrap();
        let mut article = create(store.path(), "Title", "标题").unwrap();
        fs::write(article.doc_path(), "# 新标题\n\nBody\n").unwrap();

        article.update().unwrap();

        let reopened = Article::open(article.path()).unwrap();
        assert_eq!(reopened.meta().base.title_cn, "新标题");
    }

    #[test]
    fn test_update_falls_back_to_single_markdown_file() {
        // Arrange
        let store = tempfile::tempdir().unwrap();
        let mut article = create(store.path(), "Title", "标题").unwrap();
        fs::rename(article.doc_path(), article.path_to("renamed.md")).unwrap();

        // Act
        article.update().unwrap();

        // Assert
        let reopened = Article::open(article.path()).unwrap();
        assert_eq!(reopened.meta().base.doc_name, "renamed.md");
        assert_eq!(reopened.meta().base.title_cn, "标题");
    }

    #[test]
    fn test_update_fails_with_several_markdown_files() {
        let store = tempfile::tempdir().unwrap();
        let mut article = create(store.path(), "Title", "标题").unwrap();
        fs::remove_file(article.doc_path()).unwrap();
        fs::write(article.path_to("a.md"), "# a\n").unwrap();
        fs::write(article.path_to("b.md"), "# b\n").unwrap();

        let result = article.update();

        match result {
            Err(ArticleError::TooManyMarkdownFiles { files, .. }) => {
                assert_eq!(files, vec!["a.md", "b.md"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_update_fails_without_markdown_file() {
        let store = tempfile::tempdir().unwrap();
        let mut article = create(store.path(), "Title", "标题").unwrap();
        fs::remove_file(article.doc_path()).unwrap();

        assert!(matches!(
            article.update(),
            Err(ArticleError::NoMarkdownFile(_))
        ));
    }

    #[test]
    fn test_read_doc_with_empty_doc_name() {
        let store = tempfile::tempdir().unwrap();
        let dir = store.path().join("bare");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join(META_FILE_NAME),
            "[base]\nname = \"bare\"\ncreateTime = 2021-01-01T00:00:00Z\n",
        )
        .unwrap();

        let article = Article::open(&dir).unwrap();

        assert!(matches!(
            article.read_doc(),
            Err(ArticleError::EmptyDocName(_))
        ));
    }

    #[test]
    fn test_image_files_skip_hidden_entries() {
        let store = tempfile::tempdir().unwrap();
        let article = create(store.path(), "Images", "图片").unwrap();
        fs::write(article.image_dir().join("b.png"), b"b").unwrap();
        fs::write(article.image_dir().join("a.png"), b"a").unwrap();
        fs::write(article.image_dir().join(".DS_Store"), b"").unwrap();
        fs::create_dir(article.image_dir().join("sub")).unwrap();

        let files = article.image_files().unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_resolve_path_inside_store() {
        let store = tempfile::tempdir().unwrap();
        create(store.path(), "Title", "标题").unwrap();

        let resolved = resolve_path(Path::new("标题"), Some(store.path()));
        assert_eq!(resolved, store.path().join("标题"));

        let unknown = resolve_path(Path::new("missing"), Some(store.path()));
        assert_eq!(unknown, PathBuf::from("missing"));
    }
}
