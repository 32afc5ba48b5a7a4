//! Release packaging: `dist/<id>.css` into `<id>-v<version>.zip`.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::compiler::BuildArtifact;
use crate::config::ThemeLayout;
use crate::error::ThemeError;
use crate::theme::ThemeDescriptor;

/// Package a freshly built artifact into the project root.
/// Returns the archive path.
pub fn package_release(
    layout: &ThemeLayout,
    artifact: &BuildArtifact,
) -> Result<PathBuf, ThemeError> {
    let descriptor = ThemeDescriptor::load(&layout.descriptor_path())?;
    let archive_name = descriptor.archive_name()?;
    let archive_path = layout.archive_path(&archive_name);

    info!("Packaging {}", archive_name);

    let contents = fs::read(&artifact.path).map_err(|source| ThemeError::ReadFailed {
        path: artifact.path.clone(),
        source,
    })?;
    let entry_name = descriptor.artifact_name();

    let zip_err = |source: zip::result::ZipError| ThemeError::Archive {
        path: archive_path.clone(),
        source,
    };

    let write_err = |source: std::io::Error| ThemeError::WriteFailed {
        path: archive_path.clone(),
        source,
    };

    let file = File::create(&archive_path).map_err(write_err)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(entry_name.as_str(), options).map_err(zip_err)?;
    zip.write_all(&contents).map_err(write_err)?;
    zip.finish().map_err(zip_err)?;

    Ok(archive_path)
}
