//! The web index generator.
//!
//! A generation is one full recomputation: fetch a fresh snapshot, classify
//! the assets, resolve and order the tags of each kind, assemble the template
//! state, render the document and hand it to the writer. Any failure aborts
//! before the write, so the previously written document is left untouched.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::classify::{classify, AssetKind, ClassifiedAssets};
use crate::error::Result;
use crate::options::WebIndexOptions;
use crate::snapshot::{BuildSnapshot, SnapshotSource};
use crate::state::assemble;
use crate::tags::{order_fragments, resolve_tags};
use crate::template::resolve_template;
use crate::writer::OutputWriter;

/// Result of a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIndex {
    /// Path the document was written to, as given to the writer
    pub path: PathBuf,
    pub html: String,
    /// Number of script fragments emitted
    pub scripts: usize,
    /// Number of stylesheet fragments emitted
    pub styles: usize,
}

/// Generates the HTML entry document for a build
#[derive(Debug, Clone, Default)]
pub struct WebIndexPlugin {
    options: Arc<WebIndexOptions>,
}

impl WebIndexPlugin {
    pub fn new(options: WebIndexOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// Render the document for `snapshot` without writing it
    pub async fn generate_document(&self, snapshot: &BuildSnapshot) -> Result<GeneratedIndex> {
        let options = &self.options;
        let assets = classify(snapshot, options.public_path());
        debug!(
            scripts = assets.scripts.len(),
            styles = assets.styles.len(),
            "classified assets"
        );

        let (script_markup, scripts) = self.markup(AssetKind::Script, &assets)?;
        let (css_markup, styles) = self.markup(AssetKind::Css, &assets)?;

        let state = assemble(script_markup, css_markup, options.variables());
        let template = resolve_template(options.template(), options.root()).await?;
        let html = template.render(&state)?;

        Ok(GeneratedIndex {
            path: options.out_file().to_path_buf(),
            html,
            scripts,
            styles,
        })
    }

    /// Run one full generation and write the result
    pub async fn generate<S, W>(&self, source: &S, writer: &W) -> Result<GeneratedIndex>
    where
        S: SnapshotSource + ?Sized,
        W: OutputWriter + ?Sized,
    {
        let snapshot = source.snapshot().await?;
        let generated = self.generate_document(&snapshot).await?;
        writer.write(&generated.path, &generated.html).await?;

        info!(
            path = %generated.path.display(),
            scripts = generated.scripts,
            styles = generated.styles,
            "generated web index"
        );
        Ok(generated)
    }

    fn markup(&self, kind: AssetKind, assets: &ClassifiedAssets) -> Result<(String, usize)> {
        let fragments = resolve_tags(kind, assets.of_kind(kind), self.options.transform(kind))?;
        let count = fragments.len();
        Ok((order_fragments(fragments), count))
    }
}
