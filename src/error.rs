use std::path::PathBuf;
use thiserror::Error;

/// Theme build error types
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme descriptor: {path}")]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid theme descriptor: {path}")]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Theme descriptor is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Theme descriptor field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Style compiler `{program}` could not be started")]
    CompilerUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Style compilation failed with exit code {code}: {stderr}")]
    CompileFailed { code: i32, stderr: String },

    #[error("No space left on device for {path}")]
    DiskFull { path: PathBuf },

    #[error("Failed to copy {src} to {dst}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive: {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Deploy path unavailable: {0}")]
    DeployPath(#[from] crate::resolver::DeployPathRejection),

    #[error("File watcher failed")]
    Watch(#[from] notify::Error),

    #[error("Invalid watch pattern `{pattern}`")]
    WatchPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Task dependency cycle through `{task}`")]
    TaskCycle { task: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThemeError {
    /// Whether this error came from the style preprocessor rather than the pipeline itself
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            ThemeError::CompileFailed { .. } | ThemeError::CompilerUnavailable { .. }
        )
    }
}
