//! Command-line interface definitions for bloom

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the bloom application
#[derive(Parser)]
#[command(name = "bloom")]
#[command(version)]
#[command(about = "Manage and publish markdown articles", long_about = None)]
pub struct Cli {
    /// Log what bloom is doing
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for bloom
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new article directory
    Create {
        /// English title, used for the article name
        en: String,

        /// Chinese title, used for the directory and document names
        cn: String,

        /// Directory to create the article in (defaults to the store, or the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List the articles in the store
    List,

    /// Update meta.toml from the article's document
    Update {
        /// Article directory, or its name inside the store
        path: PathBuf,
    },

    /// Print an article's document
    Show {
        /// Article directory, or its name inside the store
        path: PathBuf,

        /// Print the paragraph structure instead of the text
        #[arg(long)]
        outline: bool,
    },

    /// Upload an article's images to the image server
    Upload {
        /// Article directory, or its name inside the store
        path: PathBuf,

        /// Upload every file in img/, not just the referenced images
        #[arg(short, long)]
        all: bool,
    },

    /// Rewrite an article for a platform and deliver it
    Publish {
        /// Article directory, or its name inside the store
        path: PathBuf,

        /// Target platform (xzl, juejin, wechat, zhihu, hexo)
        #[arg(short, long)]
        platform: String,
    },
}
