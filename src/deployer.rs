//! Copies a built theme into a zEdit installation.

use std::path::PathBuf;

use tracing::info;

use crate::compiler::BuildArtifact;
use crate::copier::copy_file;
use crate::error::ThemeError;
use crate::resolver::DeployPath;

/// Destination of an artifact inside an installation: `<deploy>/themes/<file>`
pub fn deployed_path(artifact: &BuildArtifact, deploy_path: &DeployPath) -> PathBuf {
    let file_name = artifact
        .path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{}.css", artifact.id)));
    deploy_path.themes_dir().join(file_name)
}

/// Copy the build artifact into `<deploy>/themes/`, returning the destination
pub fn deploy_artifact(
    artifact: &BuildArtifact,
    deploy_path: &DeployPath,
) -> Result<PathBuf, ThemeError> {
    let dest = deployed_path(artifact, deploy_path);
    let bytes = copy_file(&artifact.path, &dest)?;

    info!(bytes, "deployed {} to {}", artifact.id, dest.display());

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::build_theme;
    use crate::compiler::tests::{make_project, FakeCompiler};
    use crate::config::ThemeLayout;
    use crate::resolver::SENTINEL_EXECUTABLE;
    use std::fs;
    use tempfile::TempDir;

    fn make_install() -> (TempDir, DeployPath) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SENTINEL_EXECUTABLE), b"MZ").unwrap();
        let path = DeployPath::validate(&temp.path().display().to_string()).unwrap();
        (temp, path)
    }

    #[test]
    fn test_deploy_artifact_copies_into_themes() {
        let project = make_project(r#"{"id":"midnight","version":"1.2.0"}"#);
        let layout = ThemeLayout::new(project.path());
        let artifact = build_theme(&layout, &FakeCompiler::ok("body{}")).unwrap();
        let (install, deploy_path) = make_install();

        let dest = deploy_artifact(&artifact, &deploy_path).unwrap();

        assert_eq!(dest, install.path().join("themes").join("midnight.css"));
        assert_eq!(
            fs::read(&dest).unwrap(),
            fs::read(&artifact.path).unwrap()
        );
    }

    #[test]
    fn test_deploy_artifact_replaces_previous() {
        let project = make_project(r#"{"id":"midnight"}"#);
        let layout = ThemeLayout::new(project.path());
        let (install, deploy_path) = make_install();
        let themes = install.path().join("themes");
        fs::create_dir_all(&themes).unwrap();
        fs::write(themes.join("midnight.css"), "stale").unwrap();
        fs::write(themes.join("other.css"), "keep").unwrap();

        let artifact = build_theme(&layout, &FakeCompiler::ok("fresh{}")).unwrap();
        deploy_artifact(&artifact, &deploy_path).unwrap();

        let deployed = fs::read_to_string(themes.join("midnight.css")).unwrap();
        assert!(deployed.ends_with("fresh{}"));
        assert_eq!(fs::read_to_string(themes.join("other.css")).unwrap(), "keep");
    }

    #[test]
    fn test_deploy_artifact_missing_build() {
        let project = TempDir::new().unwrap();
        let (_install, deploy_path) = make_install();
        let artifact = BuildArtifact {
            id: crate::theme::ThemeId::validated("midnight").unwrap(),
            path: project.path().join("dist").join("midnight.css"),
            bytes: 0,
        };

        let result = deploy_artifact(&artifact, &deploy_path);
        assert!(matches!(result, Err(ThemeError::CopyFailed { .. })));
    }
}
