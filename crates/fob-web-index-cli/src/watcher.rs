//! Build manifest watcher.
//!
//! Watches the directories containing the build manifest and template and
//! turns changes to those files into [`BuildEvent::OutputChanged`] events.
//! Parent directories are watched instead of the files themselves because
//! bundlers commonly replace the manifest by renaming a new file over it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fob_web_index::BuildEvent;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{CliError, Result};

const CHANNEL_CAPACITY: usize = 64;

/// Watches a fixed set of files for changes
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    targets: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `files`.
    ///
    /// A burst of changes is reported once, `debounce_ms` after the last
    /// change in the burst. Every file must exist when the watcher starts.
    /// Must be called inside a tokio runtime.
    pub fn new(files: &[PathBuf], debounce_ms: u64) -> Result<(Self, mpsc::Receiver<BuildEvent>)> {
        let targets = files
            .iter()
            .map(|file| resolve_target(file))
            .collect::<Result<Vec<_>>>()?;

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let watched: HashSet<PathBuf> = targets.iter().cloned().collect();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }

            for path in event.paths {
                if watched.contains(&path) {
                    let _ = raw_tx.send(path);
                }
            }
        })?;

        let directories: HashSet<&Path> = targets.iter().filter_map(|t| t.parent()).collect();
        for dir in directories {
            debug!(dir = %dir.display(), "watching directory");
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        tokio::spawn(debounce(raw_rx, tx, Duration::from_millis(debounce_ms)));

        Ok((
            Self {
                _watcher: watcher,
                targets,
            },
            rx,
        ))
    }

    /// Absolute paths of the watched files
    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }
}

/// Forward the last change of each burst once `window` passes without
/// another change. Ends when the watcher or the receiver is dropped.
async fn debounce(
    mut raw: mpsc::UnboundedReceiver<PathBuf>,
    tx: mpsc::Sender<BuildEvent>,
    window: Duration,
) {
    let mut pending: Option<PathBuf> = None;
    let mut last_change = Instant::now();

    loop {
        let quiet_at = last_change + window;
        tokio::select! {
            biased;
            changed = raw.recv() => match changed {
                Some(path) => {
                    trace!(path = %path.display(), "change queued");
                    pending = Some(path);
                    last_change = Instant::now();
                }
                None => break,
            },
            _ = tokio::time::sleep_until(quiet_at), if pending.is_some() => {
                let path = pending.take();
                if tx.send(BuildEvent::OutputChanged(path)).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Canonical directory joined with the file name, so events for a file that
/// was replaced still match.
fn resolve_target(file: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or_else(|| CliError::FileNotFound(file.to_path_buf()))?;
    let parent = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !file.exists() {
        return Err(CliError::FileNotFound(file.to_path_buf()));
    }
    Ok(parent.canonicalize()?.join(name))
}
