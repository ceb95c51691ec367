//! bloom - markdown article manager
//!
//! A CLI tool for keeping a store of markdown articles and publishing them
//! to blogging platforms.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]
#![allow(dead_code)]

mod article;
mod cli;
mod clipboard;
mod markdown;
mod meta;
mod publish;
mod settings;
mod store;
mod upload;

use anyhow::{Context, Result};
use article::Article;
use clap::Parser;
use cli::{Cli, Commands};
use publish::Platform;
use settings::Settings;
use std::path::{Path, PathBuf};

/// Main entry point for the bloom CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    let settings = Settings::load().context("Failed to load settings")?;

    match cli.command {
        Commands::Create { en, cn, dir } => {
            handle_create_command(&settings, &en, &cn, dir)?;
        }

        Commands::List => {
            handle_list_command(&settings)?;
        }

        Commands::Update { path } => {
            handle_update_command(&settings, &path)?;
        }

        Commands::Show { path, outline } => {
            handle_show_command(&settings, &path, outline)?;
        }

        Commands::Upload { path, all } => {
            handle_upload_command(&settings, &path, all)?;
        }

        Commands::Publish { path, platform } => {
            handle_publish_command(&settings, &path, &platform)?;
        }
    }

    Ok(())
}

/// Handle the create command
fn handle_create_command(
    settings: &Settings,
    en: &str,
    cn: &str,
    dir: Option<PathBuf>,
) -> Result<()> {
    let parent = dir
        .or_else(|| settings.store.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let article = article::create(&parent, en, cn)
        .with_context(|| format!("Failed to create article in {}", parent.display()))?;

    println!("✓ Created {}", article.path().display());
    println!("  name: {}", article.meta().base.name);
    println!("  document: {}", article.meta().base.doc_name);

    Ok(())
}

/// Handle the list command
fn handle_list_command(settings: &Settings) -> Result<()> {
    let store = settings.store()?;
    let names = store::list_articles(store)
        .with_context(|| format!("Failed to list articles in {}", store.display()))?;

    for name in &names {
        println!("{}", name);
    }
    println!("{} articles(collections).", names.len());

    Ok(())
}

/// Handle the update command
fn handle_update_command(settings: &Settings, path: &Path) -> Result<()> {
    let mut article = open_article(settings, path)?;
    article
        .update()
        .with_context(|| format!("Failed to update {}", article.path().display()))?;

    println!(
        "✓ Updated {} ({})",
        article.meta_path().display(),
        article.meta().base.title_cn
    );

    Ok(())
}

/// Handle the show command
fn handle_show_command(settings: &Settings, path: &Path, outline: bool) -> Result<()> {
    let article = open_article(settings, path)?;
    let doc = article.read_doc()?;

    if outline {
        print!("{}", doc.outline());
    } else {
        print!("{}", doc);
    }

    Ok(())
}

/// Handle the upload command
fn handle_upload_command(settings: &Settings, path: &Path, all: bool) -> Result<()> {
    let article = open_article(settings, path)?;
    let plan = upload::UploadPlan::new(&article, settings, all)
        .with_context(|| format!("Failed to prepare upload of {}", article.path().display()))?;

    let uploaded = plan.execute().context("Upload failed")?;
    println!(
        "✓ Uploaded {} images to {}:{}",
        uploaded, plan.destination, plan.remote_dir
    );

    Ok(())
}

/// Handle the publish command
fn handle_publish_command(settings: &Settings, path: &Path, platform: &str) -> Result<()> {
    let platform: Platform = platform.parse()?;
    let article = open_article(settings, path)?;

    let destination = publish::publish(platform, &article, settings).with_context(|| {
        format!(
            "Failed to publish {} to {}",
            article.path().display(),
            platform
        )
    })?;

    println!("✓ Published to {}: {}", platform, destination);

    Ok(())
}

/// Open the article at `path`, looking inside the store when it is not a directory here
fn open_article(settings: &Settings, path: &Path) -> Result<Article> {
    let resolved = article::resolve_path(path, settings.store.as_deref());
    Article::open(&resolved).with_context(|| format!("Failed to open {}", path.display()))
}
