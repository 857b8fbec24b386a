//! Regeneration trigger.
//!
//! Binds a [`WebIndexPlugin`] to its snapshot source and writer and runs a
//! full generation whenever the build reports that it finished or that its
//! outputs changed. Every run starts from a fresh snapshot; nothing is cached
//! between runs.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::plugin::{GeneratedIndex, WebIndexPlugin};
use crate::snapshot::SnapshotSource;
use crate::writer::OutputWriter;

/// Notification from the build driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The initial build completed
    BuildFinished,
    /// Build output changed, optionally naming the file that triggered it
    OutputChanged(Option<PathBuf>),
}

/// Runs generations in response to build events
#[derive(Clone)]
pub struct RegenerationTrigger {
    plugin: WebIndexPlugin,
    source: Arc<dyn SnapshotSource>,
    writer: Arc<dyn OutputWriter>,
}

impl std::fmt::Debug for RegenerationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegenerationTrigger")
            .field("plugin", &self.plugin)
            .finish_non_exhaustive()
    }
}

impl RegenerationTrigger {
    pub fn new(
        plugin: WebIndexPlugin,
        source: impl SnapshotSource + 'static,
        writer: impl OutputWriter + 'static,
    ) -> Self {
        Self {
            plugin,
            source: Arc::new(source),
            writer: Arc::new(writer),
        }
    }

    /// Generate once after the initial build
    pub async fn build_finished(&self) -> Result<GeneratedIndex> {
        debug!("build finished, generating web index");
        self.run().await
    }

    /// Generate once for an output change notification.
    ///
    /// Concurrent calls are not serialized; the last write wins.
    pub async fn output_changed(&self) -> Result<GeneratedIndex> {
        debug!("build output changed, regenerating web index");
        self.run().await
    }

    /// Consume build events until the channel closes or `on_result` breaks.
    ///
    /// One generation runs at a time. Events that arrive while a generation
    /// is running are coalesced into a single follow-up generation. Every
    /// result, success or failure, is passed to `on_result`. Returns the
    /// number of generations run.
    pub async fn watch<F>(&self, mut events: mpsc::Receiver<BuildEvent>, mut on_result: F) -> usize
    where
        F: FnMut(Result<GeneratedIndex>) -> ControlFlow<()>,
    {
        let mut runs = 0;

        while let Some(event) = events.recv().await {
            let mut coalesced = 0usize;
            while events.try_recv().is_ok() {
                coalesced += 1;
            }
            debug!(?event, coalesced, "regenerating web index");

            let result = match event {
                BuildEvent::BuildFinished => self.build_finished().await,
                BuildEvent::OutputChanged(_) => self.output_changed().await,
            };
            runs += 1;

            if let Err(e) = &result {
                error!(error = %e, "web index generation failed");
            }
            if on_result(result).is_break() {
                info!("stopped watching build events");
                break;
            }
        }

        runs
    }

    async fn run(&self) -> Result<GeneratedIndex> {
        self.plugin
            .generate(self.source.as_ref(), self.writer.as_ref())
            .await
    }
}
