//! CLI configuration and runtime settings for theme builds.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tasks::Task;

/// Environment variable holding a cached zEdit deploy path
pub const DEPLOY_PATH_ENV: &str = "ZEDIT_DEPLOY_PATH";

/// Build, package and deploy zEdit CSS themes
#[derive(Parser, Debug)]
#[command(name = "zedit-theme")]
#[command(version)]
#[command(about = "Build, package and deploy zEdit CSS themes")]
pub struct Cli {
    /// Task to run
    #[arg(value_enum, default_value_t = Task::Default)]
    pub task: Task,

    /// Theme project root (contains theme.json and index.scss)
    #[arg(short = 'C', long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Sass executable used to compile the stylesheet.
    /// On Windows a bare name also tries `<name>.cmd` (npm) and `<name>.bat` (standalone dart-sass)
    #[arg(long, env = "ZEDIT_THEME_SASS", default_value = "sass")]
    pub sass: PathBuf,

    /// Output style passed to the Sass compiler
    #[arg(long, value_enum, default_value_t = OutputStyle::Expanded)]
    pub style: OutputStyle,

    /// Additional Sass load paths (comma-separated)
    #[arg(short = 'I', long = "load-path", value_delimiter = ',')]
    pub load_paths: Vec<PathBuf>,

    /// zEdit installation to deploy to
    #[arg(long, env = DEPLOY_PATH_ENV)]
    pub deploy_path: Option<String>,

    /// Quiet period before a batch of file changes triggers a rebuild
    #[arg(long, default_value_t = 100)]
    pub debounce_ms: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Sass `--style` values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Expanded,
    Compressed,
}

impl OutputStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
        }
    }
}

/// Fixed file layout of a theme project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeLayout {
    root: PathBuf,
}

impl ThemeLayout {
    pub const DESCRIPTOR: &'static str = "theme.json";
    pub const ENTRY: &'static str = "index.scss";
    pub const OUTPUT_DIR: &'static str = "dist";
    pub const WATCH_PATTERNS: &'static [&'static str] = &["index.scss", "src/**/*.scss"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(Self::DESCRIPTOR)
    }

    pub fn entry_path(&self) -> PathBuf {
        self.root.join(Self::ENTRY)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(Self::OUTPUT_DIR)
    }

    /// `dist/<file_name>`
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.output_dir().join(file_name)
    }

    /// Release archives land in the project root
    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Project file layout
    pub layout: ThemeLayout,
    /// Sass executable
    pub sass: PathBuf,
    /// Sass output style
    pub style: OutputStyle,
    /// Extra Sass load paths
    pub load_paths: Vec<PathBuf>,
    /// Unvalidated deploy path seed (flag or environment)
    pub deploy_path: Option<String>,
    /// Watch debounce window
    pub debounce: Duration,
    /// Show a progress bar over task steps
    pub progress: bool,
}

impl Config {
    /// Create Config from CLI arguments
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        if !cli.root.is_dir() {
            anyhow::bail!("Theme root not found: {}", cli.root.display());
        }
        let root = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());

        let deploy_path = cli
            .deploy_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let cwd = std::env::current_dir()?;
        let load_paths = cli.load_paths.iter().map(|p| cwd.join(p)).collect();

        Ok(Config {
            layout: ThemeLayout::new(root),
            sass: cli.sass.clone(),
            style: cli.style,
            load_paths,
            deploy_path,
            debounce: Duration::from_millis(cli.debounce_ms),
            progress: false,
        })
    }

    /// Defaults for a project root, mainly for library callers and tests
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Config {
            layout: ThemeLayout::new(root),
            sass: PathBuf::from("sass"),
            style: OutputStyle::Expanded,
            load_paths: Vec::new(),
            deploy_path: None,
            debounce: Duration::from_millis(100),
            progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_cli(root: PathBuf, deploy_path: Option<&str>) -> Cli {
        Cli {
            task: Task::Default,
            root,
            sass: PathBuf::from("sass"),
            style: OutputStyle::Expanded,
            load_paths: Vec::new(),
            deploy_path: deploy_path.map(str::to_string),
            debounce_ms: 100,
            verbose: 0,
            quiet: false,
        }
    }

    // ==================== Cli parsing tests ====================

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["zedit-theme"]).unwrap();
        assert_eq!(cli.task, Task::Default);
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.style, OutputStyle::Expanded);
        assert_eq!(cli.debounce_ms, 100);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_task_names() {
        for (name, task) in [
            ("clean", Task::Clean),
            ("build", Task::Build),
            ("release", Task::Release),
            ("watch", Task::Watch),
            ("deploy", Task::Deploy),
            ("integrate", Task::Integrate),
            ("default", Task::Default),
        ] {
            let cli = Cli::try_parse_from(["zedit-theme", name]).unwrap();
            assert_eq!(cli.task, task);
        }
    }

    #[test]
    fn test_cli_unknown_task() {
        assert!(Cli::try_parse_from(["zedit-theme", "publish"]).is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "zedit-theme",
            "release",
            "-C",
            "/themes/midnight",
            "--style",
            "compressed",
            "-I",
            "vendor,shared",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.task, Task::Release);
        assert_eq!(cli.root, PathBuf::from("/themes/midnight"));
        assert_eq!(cli.style, OutputStyle::Compressed);
        assert_eq!(
            cli.load_paths,
            vec![PathBuf::from("vendor"), PathBuf::from("shared")]
        );
        assert_eq!(cli.verbose, 2);
    }

    // ==================== Config::from_cli tests ====================

    #[test]
    fn test_config_from_cli_basic() {
        let temp = TempDir::new().unwrap();
        let config = Config::from_cli(&make_cli(temp.path().to_path_buf(), None)).unwrap();

        assert_eq!(
            config.layout.root(),
            temp.path().canonicalize().unwrap().as_path()
        );
        assert_eq!(config.deploy_path, None);
        assert_eq!(config.debounce, Duration::from_millis(100));
    }

    #[test]
    fn test_config_from_cli_missing_root() {
        let temp = TempDir::new().unwrap();
        let cli = make_cli(temp.path().join("missing"), None);
        assert!(Config::from_cli(&cli).is_err());
    }

    #[test]
    fn test_config_from_cli_blank_deploy_path_ignored() {
        let temp = TempDir::new().unwrap();
        let cli = make_cli(temp.path().to_path_buf(), Some("   "));
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.deploy_path, None);
    }

    #[test]
    fn test_config_from_cli_deploy_path_kept() {
        let temp = TempDir::new().unwrap();
        let cli = make_cli(temp.path().to_path_buf(), Some("C:\\zEdit "));
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.deploy_path.as_deref(), Some("C:\\zEdit"));
    }

    #[test]
    fn test_config_from_cli_load_paths_resolved_against_cwd() {
        let temp = TempDir::new().unwrap();
        let mut cli = make_cli(temp.path().to_path_buf(), None);
        cli.load_paths = vec![PathBuf::from("vendor"), temp.path().join("shared")];

        let config = Config::from_cli(&cli).unwrap();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(
            config.load_paths,
            vec![cwd.join("vendor"), temp.path().join("shared")]
        );
    }

    // ==================== ThemeLayout tests ====================

    #[test]
    fn test_layout_paths() {
        let layout = ThemeLayout::new("/themes/midnight");

        assert_eq!(
            layout.descriptor_path(),
            PathBuf::from("/themes/midnight/theme.json")
        );
        assert_eq!(
            layout.entry_path(),
            PathBuf::from("/themes/midnight/index.scss")
        );
        assert_eq!(
            layout.artifact_path("midnight.css"),
            PathBuf::from("/themes/midnight/dist/midnight.css")
        );
        assert_eq!(
            layout.archive_path("midnight-v1.2.0.zip"),
            PathBuf::from("/themes/midnight/midnight-v1.2.0.zip")
        );
    }

    #[test]
    fn test_output_style_as_str() {
        assert_eq!(OutputStyle::Expanded.as_str(), "expanded");
        assert_eq!(OutputStyle::Compressed.as_str(), "compressed");
    }
}
