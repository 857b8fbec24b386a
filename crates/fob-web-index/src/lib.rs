#![cfg_attr(docsrs, feature(doc_cfg))]

//! # fob-web-index
//!
//! Renders the HTML entry document (`index.html`) that references a build's
//! script and stylesheet outputs.
//!
//! Each generation reads a fresh [`BuildSnapshot`], turns web-indexed bundles
//! and injected stylesheets into `<script>` and `<link>` fragments, orders
//! them, and renders a template with the result. Generations run after the
//! initial build and again whenever the build output changes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fob_web_index::{BuildSnapshot, BundleOutput, FsWriter, TagInfo, WebIndexOptions, WebIndexPlugin};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let snapshot = BuildSnapshot::new(vec![
//!     BundleOutput::new("vendor.js"),
//!     BundleOutput::new("app.js"),
//! ])
//! .with_styles(["styles.css"]);
//!
//! let plugin = WebIndexPlugin::new(
//!     WebIndexOptions::new()
//!         .script_transform(|path, filename| {
//!             let order = if filename == "app.js" { -1 } else { 0 };
//!             Ok(Some(TagInfo::new(format!("<script src={}></script>", path)).with_order(order)))
//!         })
//!         .variable("title", "My App"),
//! );
//!
//! plugin.generate(&snapshot, &FsWriter::new("dist")).await?;
//! # Ok(()) }
//! ```
//!
//! ## Watching
//!
//! ```no_run
//! use std::ops::ControlFlow;
//! use fob_web_index::{BuildEvent, ManifestSnapshot, FsWriter, RegenerationTrigger, WebIndexPlugin};
//!
//! # async fn example(events: tokio::sync::mpsc::Receiver<BuildEvent>) {
//! let trigger = RegenerationTrigger::new(
//!     WebIndexPlugin::default(),
//!     ManifestSnapshot::new("dist/manifest.json"),
//!     FsWriter::new("dist"),
//! );
//! trigger.watch(events, |_| ControlFlow::Continue(())).await;
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod options;
pub mod plugin;
pub mod rules;
pub mod snapshot;
pub mod state;
pub mod tags;
pub mod template;
pub mod trigger;
pub mod writer;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use classify::{
    AssetDescriptor, AssetKind, ClassifiedAsset, ClassifiedAssets, classify, display_name,
    join_public_path,
};
pub use config::{TagsConfig, WebIndexConfig};
pub use error::{Result, WebIndexError};
pub use options::{DEFAULT_OUT_FILE, DEFAULT_PUBLIC_PATH, WebIndexOptions};
pub use plugin::{GeneratedIndex, WebIndexPlugin};
pub use rules::{TagRule, TagRuleSet, Unmatched};
pub use snapshot::{BuildSnapshot, BundleOutput, ManifestSnapshot, SharedSnapshot, SnapshotSource};
pub use state::{CSS_KEY, SCRIPT_KEY, TemplateState, assemble};
pub use tags::{TagInfo, TagTransform, order_fragments, render_tags, resolve_tags};
pub use template::{
    BUILTIN_TEMPLATE, DEFAULT_EXPORT, ResolvedTemplate, TemplateFn, TemplateSource, render,
    resolve_template,
};
pub use trigger::{BuildEvent, RegenerationTrigger};
pub use writer::{FsWriter, MemoryWriter, OutputWriter};
