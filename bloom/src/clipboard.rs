//! System clipboard through the platform's command line tool

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use thiserror::Error;

/// Clipboard tools in order of preference, with the arguments they need
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

/// Errors that can occur when copying to the clipboard
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("No clipboard tool found (tried {})", tool_names())]
    NoTool,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

fn tool_names() -> String {
    CLIPBOARD_TOOLS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find the first clipboard tool on `PATH`
fn find_tool() -> Option<(PathBuf, &'static [&'static str])> {
    CLIPBOARD_TOOLS
        .iter()
        .find_map(|(name, args)| which::which(name).ok().map(|path| (path, *args)))
}

/// Replace the clipboard contents with `text`
pub fn copy(text: &str) -> Result<(), ClipboardError> {
    let (program, args) = find_tool().ok_or(ClipboardError::NoTool)?;
    let name = program.display().to_string();
    log::debug!("Copying {} bytes with {}", text.len(), name);

    let spawn_error = |source| ClipboardError::Spawn {
        program: name.clone(),
        source,
    };
    let mut child = Command::new(&program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(spawn_error)?;

    let status = write_and_wait(&mut child, text).map_err(spawn_error)?;
    if !status.success() {
        return Err(ClipboardError::Failed {
            program: name,
            status,
        });
    }
    Ok(())
}

/// Feed `text` to the child's stdin, close it and reap the child
///
/// The child is waited on even when the write fails; the write error is
/// returned after that.
fn write_and_wait(child: &mut Child, text: &str) -> std::io::Result<ExitStatus> {
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written.map(|()| status)
}
