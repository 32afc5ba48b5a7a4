use std::fs;
use std::io;
use std::path::Path;

use crate::error::ThemeError;

/// ENOSPC on Unix
const DISK_FULL_OS_ERROR: i32 = 28;

fn is_disk_full(e: &io::Error) -> bool {
    e.raw_os_error() == Some(DISK_FULL_OS_ERROR)
}

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> Result<(), ThemeError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| {
        if is_disk_full(&e) {
            return ThemeError::DiskFull {
                path: path.to_path_buf(),
            };
        }
        ThemeError::CreateDirFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Copy a single file from src to dst, overwriting dst
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, ThemeError> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    fs::copy(src, dst).map_err(|e| {
        if is_disk_full(&e) {
            return ThemeError::DiskFull {
                path: dst.to_path_buf(),
            };
        }
        ThemeError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source: e,
        }
    })
}
