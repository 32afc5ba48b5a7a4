//! zEdit deploy-path resolution.
//!
//! A deploy path is only ever constructed through [`DeployPath::validate`],
//! which requires `zEdit.exe` directly inside the directory. The resolved
//! value lives in a [`DeployPathCache`] owned by the task runner; nothing is
//! written back to the process environment.
//!
//! When no valid path is cached the user is asked once on standard input.
//! The read happens on a background thread so the wait can be cancelled
//! (Ctrl+C) without blocking on the terminal.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Executable that marks a directory as a zEdit installation
pub const SENTINEL_EXECUTABLE: &str = "zEdit.exe";

/// Subdirectory of the installation that receives themes
pub const THEMES_DIR: &str = "themes";

pub const PROMPT: &str = "Enter the path to the zEdit installation you would like to deploy to:";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why a deploy path could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployPathRejection {
    #[error("no zEdit Deploy Path was entered")]
    Empty,

    #[error("\"{input}\" is not a valid zEdit Deploy Path.")]
    Invalid { input: String },

    #[error("deploy path prompt was cancelled")]
    Cancelled,

    #[error("standard input closed before a deploy path was entered")]
    InputClosed,

    #[error("failed to read deploy path: {0}")]
    Io(String),
}

/// Validated zEdit installation directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPath(PathBuf);

impl DeployPath {
    /// Accept `input` iff `<input>/zEdit.exe` is a file
    pub fn validate(input: &str) -> Result<Self, DeployPathRejection> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DeployPathRejection::Empty);
        }

        let path = PathBuf::from(trimmed);
        if path.join(SENTINEL_EXECUTABLE).is_file() {
            Ok(Self(path))
        } else {
            Err(DeployPathRejection::Invalid {
                input: trimmed.to_string(),
            })
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// `<deploy>/themes`
    pub fn themes_dir(&self) -> PathBuf {
        self.0.join(THEMES_DIR)
    }
}

impl fmt::Display for DeployPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Outstanding single-line prompt on a reader
pub struct PromptRequest {
    rx: Receiver<io::Result<Option<String>>>,
}

impl PromptRequest {
    /// Print the prompt to `out` and start reading one line from `reader`
    pub fn spawn<R, W>(reader: R, out: &mut W) -> Self
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let _ = write!(out, "{}", PROMPT);
        let _ = out.flush();

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = reader;
            let mut line = String::new();
            let result = match reader.read_line(&mut line) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(line)),
                Err(e) => Err(e),
            };
            // Receiver may be gone after cancellation
            let _ = tx.send(result);
        });

        Self { rx }
    }

    /// Wait for the line and validate it. No retry: a bad line rejects.
    pub fn wait(self, shutdown: &AtomicBool) -> Result<DeployPath, DeployPathRejection> {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Err(DeployPathRejection::Cancelled);
            }

            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(Some(line))) => return DeployPath::validate(&line),
                Ok(Ok(None)) => return Err(DeployPathRejection::InputClosed),
                Ok(Err(e)) => return Err(DeployPathRejection::Io(e.to_string())),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DeployPathRejection::InputClosed)
                }
            }
        }
    }
}

/// Deploy path state for one run: unresolved until a valid path is seen
#[derive(Debug, Clone, Default)]
pub struct DeployPathCache {
    resolved: Option<DeployPath>,
}

impl DeployPathCache {
    /// Start from a configured seed; an invalid seed is dropped
    pub fn seeded(seed: Option<&str>) -> Self {
        let resolved = seed.and_then(|s| match DeployPath::validate(s) {
            Ok(path) => {
                debug!(deploy_path = %path, "using configured deploy path");
                Some(path)
            }
            Err(reason) => {
                warn!("ignoring configured deploy path: {}", reason);
                None
            }
        });
        Self { resolved }
    }

    #[cfg(test)]
    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Return the cached path, or prompt once on `input`.
    /// `input` is only consumed when a prompt is needed.
    pub fn resolve<R, W>(
        &mut self,
        input: impl FnOnce() -> R,
        out: &mut W,
        shutdown: &AtomicBool,
    ) -> Result<DeployPath, DeployPathRejection>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        if let Some(path) = &self.resolved {
            return Ok(path.clone());
        }

        let path = PromptRequest::spawn(input(), out).wait(shutdown)?;
        info!(deploy_path = %path, "deploy path set");
        self.resolved = Some(path.clone());
        Ok(path)
    }
}
