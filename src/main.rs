use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use zedit_theme_build::compiler::SassCommand;
use zedit_theme_build::config::{Cli, Config};
use zedit_theme_build::error::ThemeError;
use zedit_theme_build::logging::init_logging;
use zedit_theme_build::tasks::{Runner, TaskOutcome};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    let mut config = Config::from_cli(&cli)?;
    config.progress = cli.verbose == 0 && !cli.quiet && std::io::stderr().is_terminal();

    // Setup Ctrl+C handler
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let compiler = Box::new(SassCommand::from_config(&config));
    let mut runner = Runner::new(config, compiler, Arc::clone(&shutdown));

    match runner.run(cli.task) {
        Ok(TaskOutcome::Completed) => Ok(ExitCode::SUCCESS),
        Ok(TaskOutcome::Cancelled) => Ok(ExitCode::from(130)),
        Err(ThemeError::DeployPath(rejection)) if shutdown.load(Ordering::Relaxed) => {
            eprintln!("\n{rejection}");
            Ok(ExitCode::from(130))
        }
        Err(e @ (ThemeError::CompileFailed { .. }
        | ThemeError::CompilerUnavailable { .. }
        | ThemeError::DeployPath(_))) => {
            eprintln!("Error: {:#}", anyhow::Error::new(e));
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("Task `{}` failed", cli.task))),
    }
}
