//! Source watching for `watch` and `integrate`.
//!
//! Change notifications are debounced into batches; each batch runs the
//! task exactly once. Runs happen on the watch thread, so a change that
//! arrives mid-build is picked up by the next batch instead of starting a
//! second build alongside the first.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use glob::{MatchOptions, Pattern};
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::ThemeLayout;
use crate::error::ThemeError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Terminal bell written when a watched run fails
pub const BELL: &str = "\u{0007}";

/// Glob patterns relative to the project root
#[derive(Debug, Clone)]
pub struct WatchPatterns {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl WatchPatterns {
    pub fn new(root: impl Into<PathBuf>, patterns: &[&str]) -> Result<Self, ThemeError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| ThemeError::WatchPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            root: root.into(),
            patterns,
        })
    }

    /// Default source patterns for a theme project
    pub fn for_layout(layout: &ThemeLayout) -> Result<Self, ThemeError> {
        Self::new(layout.root(), ThemeLayout::WATCH_PATTERNS)
    }

    pub fn matches(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(relative, options))
    }

    /// Source files currently matched under the root
    pub fn scan(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| !(e.depth() == 1 && e.file_name() == ThemeLayout::OUTPUT_DIR))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.matches(e.path()))
            .map(|e| e.into_path())
            .collect()
    }
}

/// Pending changes waiting for a quiet period
#[derive(Debug)]
pub struct WatchBatcher {
    debounce: Duration,
    pending: BTreeSet<PathBuf>,
    last_change: Option<Instant>,
}

impl WatchBatcher {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: BTreeSet::new(),
            last_change: None,
        }
    }

    pub fn add_change(&mut self, path: PathBuf) {
        self.pending.insert(path);
        self.last_change = Some(Instant::now());
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        match self.last_change {
            Some(last) => !self.pending.is_empty() && last.elapsed() >= self.debounce,
            None => false,
        }
    }

    pub fn take(&mut self) -> Vec<PathBuf> {
        self.last_change = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

/// Counters from a finished watch loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub batches: usize,
    pub failures: usize,
}

/// Drive batches from a stream of changed paths.
///
/// Returns when `shutdown` is set or the sender side hangs up. A failing
/// batch rings the bell on `out`; compile errors keep the loop going, any
/// other error ends it.
pub fn watch_loop<W, F>(
    rx: &Receiver<PathBuf>,
    patterns: &WatchPatterns,
    debounce: Duration,
    shutdown: &AtomicBool,
    out: &mut W,
    mut on_batch: F,
) -> Result<WatchSummary, ThemeError>
where
    W: Write,
    F: FnMut(&[PathBuf]) -> Result<(), ThemeError>,
{
    let mut batcher = WatchBatcher::new(debounce);
    let mut summary = WatchSummary::default();
    let mut connected = true;

    while connected && !shutdown.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(path) => {
                if patterns.matches(&path) {
                    debug!(path = %path.display(), "source changed");
                    batcher.add_change(path);
                }
                continue;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => connected = false,
        }

        if batcher.is_ready() || (!connected && !batcher.is_empty()) {
            let changes = batcher.take();
            info!("{} file(s) changed, rebuilding", changes.len());
            summary.batches += 1;

            if let Err(e) = on_batch(&changes) {
                summary.failures += 1;
                let _ = write!(out, "{}", BELL);
                let _ = out.flush();
                if !e.is_compile_error() {
                    return Err(e);
                }
                error!("{:#}", anyhow::Error::new(e));
            }
        }
    }

    Ok(summary)
}

/// Watch the project sources until `shutdown` is set
pub fn watch<F>(
    layout: &ThemeLayout,
    debounce: Duration,
    shutdown: &AtomicBool,
    on_batch: F,
) -> Result<WatchSummary, ThemeError>
where
    F: FnMut(&[PathBuf]) -> Result<(), ThemeError>,
{
    let patterns = WatchPatterns::for_layout(layout)?;

    let sources = patterns.scan();
    if sources.is_empty() {
        warn!(
            "no files match {} under {}",
            ThemeLayout::WATCH_PATTERNS.join(", "),
            layout.root().display()
        );
    }

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) if event.kind.is_access() => {}
            Ok(event) => {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
            Err(e) => warn!("watch error: {}", e),
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(layout.root(), RecursiveMode::Recursive)?;

    info!(
        "watching {} source file(s) in {}",
        sources.len(),
        layout.root().display()
    );

    let summary = watch_loop(
        &rx,
        &patterns,
        debounce,
        shutdown,
        &mut std::io::stdout(),
        on_batch,
    )?;

    info!("stopped watching after {} rebuild(s)", summary.batches);
    Ok(summary)
}
