//! Task graph and runner.
//!
//! Tasks declare their dependencies explicitly; [`plan`] turns a requested
//! task into a dependency-first execution order. [`Runner`] carries all run
//! state (configuration, compiler, resolved deploy path) so no step reads or
//! writes process-wide globals.

use std::collections::HashSet;
use std::fmt;
use std::io::{self, BufRead, BufReader};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::compiler::{build_theme, clean_output, BuildArtifact, StyleCompiler};
use crate::config::Config;
use crate::deployer::deploy_artifact;
use crate::error::ThemeError;
use crate::packager::package_release;
use crate::resolver::{DeployPath, DeployPathCache};
use crate::watcher::{watch, WatchSummary};

/// Named tasks selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Remove the output directory
    Clean,
    /// Compile the stylesheet into dist/<id>.css
    Build,
    /// Package the build into <id>-v<version>.zip
    Release,
    /// Rebuild on every source change
    Watch,
    /// Copy the build into a zEdit installation
    Deploy,
    /// Ask for a zEdit installation, then rebuild and deploy on every change
    Integrate,
    /// Same as build
    Default,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Clean => "clean",
            Task::Build => "build",
            Task::Release => "release",
            Task::Watch => "watch",
            Task::Deploy => "deploy",
            Task::Integrate => "integrate",
            Task::Default => "default",
        }
    }

    /// Direct dependencies, run before the task itself
    pub fn dependencies(&self) -> &'static [Task] {
        match self {
            Task::Build => &[Task::Clean],
            Task::Release | Task::Deploy | Task::Default => &[Task::Build],
            Task::Clean | Task::Watch | Task::Integrate => &[],
        }
    }

    /// Long-running tasks never finish on their own
    pub fn is_continuous(&self) -> bool {
        matches!(self, Task::Watch | Task::Integrate)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency-first execution order for `task`
pub fn plan(task: Task) -> Result<Vec<Task>, ThemeError> {
    plan_with(task, |t| t.dependencies())
}

/// Topological order over an arbitrary dependency function
pub fn plan_with<D>(task: Task, deps: D) -> Result<Vec<Task>, ThemeError>
where
    D: Fn(Task) -> &'static [Task],
{
    fn visit<D: Fn(Task) -> &'static [Task]>(
        task: Task,
        deps: &D,
        done: &mut HashSet<Task>,
        in_progress: &mut HashSet<Task>,
        order: &mut Vec<Task>,
    ) -> Result<(), ThemeError> {
        if done.contains(&task) {
            return Ok(());
        }
        if !in_progress.insert(task) {
            return Err(ThemeError::TaskCycle {
                task: task.as_str(),
            });
        }
        for dep in deps(task) {
            visit(*dep, deps, done, in_progress, order)?;
        }
        in_progress.remove(&task);
        done.insert(task);
        order.push(task);
        Ok(())
    }

    let mut order = Vec::new();
    visit(
        task,
        &deps,
        &mut HashSet::new(),
        &mut HashSet::new(),
        &mut order,
    )?;
    Ok(order)
}

/// How a task run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    /// Stopped by Ctrl+C
    Cancelled,
}

type InputFactory = Box<dyn FnMut() -> Box<dyn BufRead + Send>>;

/// Executes task plans against one theme project
pub struct Runner {
    config: Config,
    compiler: Box<dyn StyleCompiler>,
    deploy_path: DeployPathCache,
    input: InputFactory,
    shutdown: Arc<AtomicBool>,
    last_build: Option<BuildArtifact>,
}

impl Runner {
    pub fn new(config: Config, compiler: Box<dyn StyleCompiler>, shutdown: Arc<AtomicBool>) -> Self {
        let deploy_path = DeployPathCache::seeded(config.deploy_path.as_deref());
        Self {
            config,
            compiler,
            deploy_path,
            input: Box::new(|| Box::new(BufReader::new(io::stdin()))),
            shutdown,
            last_build: None,
        }
    }

    /// Read deploy-path answers from somewhere other than stdin
    pub fn with_input<F>(mut self, input: F) -> Self
    where
        F: FnMut() -> Box<dyn BufRead + Send> + 'static,
    {
        self.input = Box::new(input);
        self
    }

    #[cfg(test)]
    pub(crate) fn deploy_path(&self) -> &DeployPathCache {
        &self.deploy_path
    }

    #[cfg(test)]
    pub(crate) fn last_build(&self) -> Option<&BuildArtifact> {
        self.last_build.as_ref()
    }

    /// Run `task` and its dependencies
    pub fn run(&mut self, task: Task) -> Result<TaskOutcome, ThemeError> {
        let steps = plan(task)?;
        info!(
            "running {} ({})",
            task,
            steps.iter().map(Task::as_str).collect::<Vec<_>>().join(" -> ")
        );

        let progress = if self.config.progress && !task.is_continuous() {
            let pb = ProgressBar::new(steps.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:20.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for step in steps {
            progress.set_message(step.as_str());
            let outcome = self.run_step(step);
            progress.inc(1);

            match outcome {
                Ok(TaskOutcome::Completed) => {}
                other => {
                    progress.abandon();
                    return other;
                }
            }
        }

        progress.finish_and_clear();
        Ok(TaskOutcome::Completed)
    }

    fn run_step(&mut self, step: Task) -> Result<TaskOutcome, ThemeError> {
        match step {
            Task::Clean => clean_output(&self.config.layout)?,
            Task::Build => {
                self.build()?;
            }
            Task::Release => {
                let artifact = self.built_artifact()?;
                package_release(&self.config.layout, &artifact)?;
            }
            Task::Deploy => self.deploy()?,
            Task::Watch => return self.watch_with(Task::Build),
            Task::Integrate => {
                self.resolve_deploy_path()?;
                return self.watch_with(Task::Deploy);
            }
            Task::Default => {}
        }
        Ok(TaskOutcome::Completed)
    }

    fn build(&mut self) -> Result<BuildArtifact, ThemeError> {
        match build_theme(&self.config.layout, self.compiler.as_ref()) {
            Ok(artifact) => {
                self.last_build = Some(artifact.clone());
                Ok(artifact)
            }
            Err(e) => {
                self.last_build = None;
                Err(e)
            }
        }
    }

    fn built_artifact(&mut self) -> Result<BuildArtifact, ThemeError> {
        match &self.last_build {
            Some(artifact) => Ok(artifact.clone()),
            None => self.build(),
        }
    }

    fn resolve_deploy_path(&mut self) -> Result<DeployPath, ThemeError> {
        let input = &mut self.input;
        let path = self
            .deploy_path
            .resolve(|| input(), &mut io::stdout(), &self.shutdown)?;
        Ok(path)
    }

    fn deploy(&mut self) -> Result<(), ThemeError> {
        let artifact = self.built_artifact()?;
        let deploy_path = self.resolve_deploy_path()?;
        deploy_artifact(&artifact, &deploy_path)?;
        Ok(())
    }

    fn watch_with(&mut self, task: Task) -> Result<TaskOutcome, ThemeError> {
        let layout = self.config.layout.clone();
        let debounce = self.config.debounce;
        let shutdown = Arc::clone(&self.shutdown);

        let summary: WatchSummary = watch(&layout, debounce, &shutdown, |_| {
            // Every batch is a fresh run of the task and its dependencies
            self.last_build = None;
            self.run(task).map(|_| ())
        })?;

        info!(
            "{} rebuild(s), {} failed",
            summary.batches, summary.failures
        );
        Ok(TaskOutcome::Cancelled)
    }
}
