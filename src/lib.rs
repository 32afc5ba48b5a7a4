//! # zEdit Theme Build
//!
//! Build tooling for zEdit CSS themes.
//!
//! A theme project holds a `theme.json` descriptor and an `index.scss`
//! entry point. This library compiles the entry point with an external Sass
//! executable, stamps the descriptor metadata on top, and writes
//! `dist/<id>.css`. The result can be packaged as `<id>-v<version>.zip` or
//! copied into a zEdit installation, and watch mode repeats either on every
//! source change.
//!
//! ## Usage
//!
//! ```ignore
//! use zedit_theme_build::config::Config;
//! use zedit_theme_build::compiler::SassCommand;
//! use zedit_theme_build::tasks::{Runner, Task};
//!
//! let config = Config::for_root("themes/midnight");
//! let compiler = Box::new(SassCommand::from_config(&config));
//! let mut runner = Runner::new(config, compiler, shutdown);
//! runner.run(Task::Release)?;
//! ```

/// Stylesheet compilation
pub mod compiler;

/// CLI configuration and project layout
pub mod config;

/// Single-file copy with disk-full detection
pub mod copier;

/// Deployment into a zEdit installation
pub mod deployer;

/// Error types for theme builds
pub mod error;

/// Tracing subscriber setup
pub mod logging;

/// Release archive packaging
pub mod packager;

/// Deploy path validation and prompting
pub mod resolver;

/// Task graph and runner
pub mod tasks;

/// Theme descriptor
pub mod theme;

/// Source watching
pub mod watcher;
