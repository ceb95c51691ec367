//! Listing of the article store

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while listing the store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Article store not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read article store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Names of the entries directly inside the store, sorted
///
/// Hidden entries (starting with `.`) are skipped. Collections and loose
/// files are listed too, as every visible entry counts as an article.
pub fn list_articles(store: &Path) -> Result<Vec<String>, StoreError> {
    if !store.is_dir() {
        return Err(StoreError::NotFound(store.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(store)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| StoreError::Io {
            path: store.to_path_buf(),
            source: e.into(),
        })?;
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            log::debug!("Skipping hidden entry {}", name);
            continue;
        }
        names.push(name.into_owned());
    }

    Ok(names)
}
