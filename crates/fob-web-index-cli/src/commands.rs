//! `render` and `watch` commands.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use fob_web_index::{
    FsWriter, GeneratedIndex, ManifestSnapshot, RegenerationTrigger, TemplateSource,
    WebIndexPlugin,
};
use tokio::signal;
use tracing::{debug, info, warn};

use crate::cli::{IndexArgs, RenderArgs, WatchArgs};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::watcher::FileWatcher;

/// A configured trigger plus the files whose changes should regenerate it
pub struct Session {
    pub trigger: RegenerationTrigger,
    pub watched: Vec<PathBuf>,
}

impl Session {
    /// Resolve config, manifest and output paths against `cwd`
    pub fn load(args: &IndexArgs, cwd: &Path) -> Result<Self> {
        let manifest = cwd.join(&args.manifest);
        if !manifest.exists() {
            return Err(CliError::FileNotFound(manifest));
        }

        let config = CliConfig::load(args, cwd)?;
        debug!(?config, "resolved configuration");

        let (out_dir, options) = config.into_options()?;
        let root = cwd.join(options.root());
        let options = options.with_root(&root);

        let mut watched = vec![manifest.clone()];
        if let TemplateSource::Path(template) = options.template() {
            watched.push(root.join(template));
        }

        let trigger = RegenerationTrigger::new(
            WebIndexPlugin::new(options),
            ManifestSnapshot::new(manifest),
            FsWriter::new(cwd.join(out_dir)),
        );

        Ok(Self { trigger, watched })
    }
}

/// Generate once
pub async fn render(args: &RenderArgs, cwd: &Path) -> Result<GeneratedIndex> {
    let session = Session::load(&args.index, cwd)?;
    Ok(session.trigger.build_finished().await?)
}

pub async fn render_execute(args: RenderArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    render(&args, &cwd).await?;
    Ok(())
}

/// Generate, then regenerate on every change until Ctrl+C.
///
/// The initial generation must succeed; later failures keep the previous
/// document and watching continues.
pub async fn watch_execute(args: WatchArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let session = Session::load(&args.index, &cwd)?;
    watch_until(session, args.debounce_ms, async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Generate, then regenerate on every change to the watched files until
/// `shutdown` completes
pub async fn watch_until(
    session: Session,
    debounce_ms: u64,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    session.trigger.build_finished().await?;

    let (watcher, events) = FileWatcher::new(&session.watched, debounce_ms)?;
    for target in watcher.targets() {
        info!(path = %target.display(), "watching for changes");
    }
    info!("Press Ctrl+C to stop");

    let watch = session.trigger.watch(events, |result| {
        if result.is_err() {
            warn!("keeping the previous web index");
        }
        ControlFlow::Continue(())
    });

    tokio::select! {
        runs = watch => {
            warn!(runs, "file watcher stopped unexpectedly");
        }
        _ = shutdown => {
            info!("shutting down");
        }
    }

    Ok(())
}
