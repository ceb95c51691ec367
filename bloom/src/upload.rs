//! Upload of article images to the image server over ssh/scp

use crate::article::{Article, ArticleError};
use crate::settings::{Settings, SettingsError};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur during upload
#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Article(#[from] ArticleError),

    #[error("`{0}' not found on PATH")]
    MissingProgram(&'static str),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}' exited with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },
}

/// What to upload and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    /// `user@host`
    pub destination: String,
    /// Directory on the server, `<base_dir>/<article name>`
    pub remote_dir: String,
    /// Local files to copy
    pub files: Vec<PathBuf>,
}

impl UploadPlan {
    /// Decide which files of `article` go to the server
    ///
    /// With `all`, every file of the image directory is uploaded. Otherwise
    /// only the local images the document references; those that do not
    /// exist are reported and skipped.
    pub fn new(article: &Article, settings: &Settings, all: bool) -> Result<Self, UploadError> {
        let destination = format!("{}@{}", settings.upload_user()?, settings.upload_host()?);
        let remote_dir = format!(
            "{}/{}",
            settings.upload_base_dir()?.trim_end_matches('/'),
            article.meta().base.name
        );

        let files = if all {
            article.image_files()?
        } else {
            referenced_images(article)?
        };

        Ok(Self {
            destination,
            remote_dir,
            files,
        })
    }

    /// Command lines to run, program first
    pub fn commands(&self) -> Vec<Vec<OsString>> {
        let mkdir = vec![
            OsString::from("ssh"),
            OsString::from(&self.destination),
            OsString::from("mkdir"),
            OsString::from("-p"),
            OsString::from(&self.remote_dir),
        ];

        let mut scp = vec![OsString::from("scp"), OsString::from("-r")];
        scp.extend(self.files.iter().map(|file| file.as_os_str().to_owned()));
        scp.push(OsString::from(format!(
            "{}:{}",
            self.destination, self.remote_dir
        )));

        vec![mkdir, scp]
    }

    /// Run the ssh and scp commands
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of files uploaded
    /// * `Err(UploadError)` - A program is missing or a command failed
    pub fn execute(&self) -> Result<usize, UploadError> {
        if self.files.is_empty() {
            log::info!("No images to upload");
            return Ok(0);
        }
        for program in ["ssh", "scp"] {
            if which::which(program).is_err() {
                return Err(UploadError::MissingProgram(program));
            }
        }

        for command in self.commands() {
            run(&command)?;
        }
        Ok(self.files.len())
    }
}

/// Local images referenced by the document that exist on disk, in document order
fn referenced_images(article: &Article) -> Result<Vec<PathBuf>, UploadError> {
    let doc = article.read_doc()?;
    let mut files: Vec<PathBuf> = Vec::new();

    for image in doc.images() {
        if image.is_online() {
            continue;
        }
        let path = article.path_to(&image.uri);
        if !path.is_file() {
            log::warn!("Image {} does not exist, skipping", path.display());
            continue;
        }
        if !files.contains(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn run(command: &[OsString]) -> Result<(), UploadError> {
    let line = command
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };
    log::info!("Running {}", line);

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| UploadError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source: e,
        })?;
    if !status.success() {
        return Err(UploadError::CommandFailed {
            command: line,
            status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article;
    use std::fs;

    fn upload_settings() -> Settings {
        toml::from_str(
            r#"
[upload]
host = "images.example.com"
user = "deploy"
base_dir = "/var/www/img/"
"#,
        )
        .unwrap()
    }

    fn article_with_images(store: &std::path::Path) -> Article {
        let article = article::create(store, "Images", "图片").unwrap();
        fs::write(
            article.doc_path(),
            "# 图片\n\n![a](img/a.png)\n\n![online](https://x.com/o.png)\n\n> ![b](img/b.png)\n\n![gone](img/gone.png)\n",
        )
        .unwrap();
        fs::write(article.image_dir().join("a.png"), b"a").unwrap();
        fs::write(article.image_dir().join("b.png"), b"b").unwrap();
        fs::write(article.image_dir().join("unused.png"), b"u").unwrap();
        article
    }

    #[test]
    fn test_plan_referenced_images() {
        // Arrange
        let store = tempfile::tempdir().unwrap();
        let article = article_with_images(store.path());

        // Act
        let plan = UploadPlan::new(&article, &upload_settings(), false).unwrap();

        // Assert
        assert_eq!(plan.destination, "deploy@images.example.com");
        assert_eq!(plan.remote_dir, "/var/www/img/images");
        assert_eq!(
            plan.files,
            vec![
                article.image_dir().join("a.png"),
                article.image_dir().join("b.png")
            ]
        );
    }

    #[test]
    fn test_plan_all_images() {
        let store = tempfile::tempdir().unwrap();
        let article = article_with_images(store.path());

        let plan = UploadPlan::new(&article, &upload_settings(), true).unwrap();

        assert_eq!(plan.files.len(), 3);
    }

    #[test]
    fn test_commands() {
        let plan = UploadPlan {
            destination: "me@host".to_string(),
            remote_dir: "/srv/img/post".to_string(),
            files: vec![PathBuf::from("img/a.png"), PathBuf::from("img/b.png")],
        };

        let commands = plan.commands();

        assert_eq!(
            commands[0],
            vec!["ssh", "me@host", "mkdir", "-p", "/srv/img/post"]
        );
        assert_eq!(
            commands[1],
            vec!["scp", "-r", "img/a.png", "img/b.png", "me@host:/srv/img/post"]
        );
    }

    #[test]
    fn test_missing_upload_settings() {
        let store = tempfile::tempdir().unwrap();
        let article = article_with_images(store.path());

        let result = UploadPlan::new(&article, &Settings::default(), false);

        assert!(matches!(
            result,
            Err(UploadError::Settings(SettingsError::Missing { .. }))
        ));
    }

    #[test]
    fn test_empty_plan_runs_nothing() {
        let plan = UploadPlan {
            destination: "me@host".to_string(),
            remote_dir: "/srv".to_string(),
            files: vec![],
        };
        assert_eq!(plan.execute().unwrap(), 0);
    }
}
