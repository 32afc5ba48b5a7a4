//! Stylesheet compilation.
//!
//! The SCSS entry point is handed to an external Sass executable; the
//! resulting CSS is stamped with the descriptor header and written to
//! `dist/<id>.css`. Every build starts from an empty output directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::{Config, OutputStyle, ThemeLayout};
use crate::error::ThemeError;
use crate::theme::{ThemeDescriptor, ThemeId};

/// Turns a stylesheet entry point into CSS text
pub trait StyleCompiler {
    fn compile(&self, entry: &Path) -> Result<String, ThemeError>;
}

/// Sass command line compiler (dart-sass compatible flags)
#[derive(Debug, Clone)]
pub struct SassCommand {
    program: PathBuf,
    style: OutputStyle,
    load_paths: Vec<PathBuf>,
}

impl SassCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            style: OutputStyle::Expanded,
            load_paths: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.sass.clone(),
            style: config.style,
            load_paths: config.load_paths.clone(),
        }
    }

    /// Arguments passed for a given entry file
    pub fn args(&self, entry: &Path) -> Vec<String> {
        let mut args = vec![
            "--no-source-map".to_string(),
            format!("--style={}", self.style.as_str()),
        ];
        for path in &self.load_paths {
            args.push(format!("--load-path={}", path.display()));
        }
        args.push(entry.display().to_string());
        args
    }
}

impl StyleCompiler for SassCommand {
    fn compile(&self, entry: &Path) -> Result<String, ThemeError> {
        debug!(program = %self.program.display(), entry = %entry.display(), "running sass");

        let candidates = program_candidates(&self.program, cfg!(windows));
        let mut last_err = None;
        let mut output = None;
        for program in &candidates {
            match Command::new(program).args(self.args(entry)).output() {
                Ok(out) => {
                    output = Some(out);
                    break;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => last_err = Some(e),
                Err(e) => {
                    last_err = Some(e);
                    break;
                }
            }
        }

        let output = match output {
            Some(output) => output,
            None => {
                return Err(ThemeError::CompilerUnavailable {
                    program: self.program.clone(),
                    source: last_err
                        .unwrap_or_else(|| std::io::Error::from(ErrorKind::NotFound)),
                })
            }
        };

        if !output.status.success() {
            return Err(ThemeError::CompileFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Executables to try for `program`.
/// On Windows a bare name also tries the npm (`.cmd`) and standalone (`.bat`) launchers.
fn program_candidates(program: &Path, windows: bool) -> Vec<PathBuf> {
    let mut candidates = vec![program.to_path_buf()];
    if windows && program.extension().is_none() {
        candidates.push(program.with_extension("cmd"));
        candidates.push(program.with_extension("bat"));
    }
    candidates
}

/// The compiled stylesheet on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub id: ThemeId,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Remove the output directory; a missing directory is fine
pub fn clean_output(layout: &ThemeLayout) -> Result<(), ThemeError> {
    let dir = layout.output_dir();
    match fs::remove_dir_all(&dir) {
        Ok(()) => {
            debug!(dir = %dir.display(), "removed output directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ThemeError::Io(e)),
    }
}

/// Compile the theme into `dist/<id>.css`
pub fn build_theme(
    layout: &ThemeLayout,
    compiler: &dyn StyleCompiler,
) -> Result<BuildArtifact, ThemeError> {
    let descriptor = ThemeDescriptor::load(&layout.descriptor_path())?;

    clean_output(layout)?;

    let css = compiler.compile(&layout.entry_path())?;
    let mut text = descriptor.header_comment();
    text.push_str(&css);

    let output_dir = layout.output_dir();
    fs::create_dir_all(&output_dir).map_err(|source| ThemeError::CreateDirFailed {
        path: output_dir.clone(),
        source,
    })?;

    let path = layout.artifact_path(&descriptor.artifact_name());
    fs::write(&path, &text).map_err(|source| ThemeError::WriteFailed {
        path: path.clone(),
        source,
    })?;

    info!(artifact = %path.display(), "built theme {}", descriptor.id);

    Ok(BuildArtifact {
        id: descriptor.id,
        path,
        bytes: text.len() as u64,
    })
}
