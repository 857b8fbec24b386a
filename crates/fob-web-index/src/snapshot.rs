//! Build snapshots and the sources they are read from.
//!
//! The bundler owns the build; the web index only reads a [`BuildSnapshot`]
//! from a [`SnapshotSource`] at the start of every generation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexSet;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WebIndexError};

/// One logical bundle as reported by the bundler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutput {
    /// Informational bundle name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the bundle belongs in the index (lazy chunks do not)
    #[serde(default = "default_web_indexed")]
    pub web_indexed: bool,

    /// Folder the output is written to, relative to the output root
    #[serde(default)]
    pub output_folder: String,

    /// Primary output filename; `None` when the bundle produced nothing
    #[serde(default)]
    pub output_filename: Option<String>,
}

fn default_web_indexed() -> bool {
    true
}

impl BundleOutput {
    /// A web-indexed bundle with the given primary output
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            name: None,
            web_indexed: true,
            output_folder: String::new(),
            output_filename: Some(filename.into()),
        }
    }

    /// A web-indexed bundle that produced no primary output
    pub fn without_output() -> Self {
        Self {
            name: None,
            web_indexed: true,
            output_folder: String::new(),
            output_filename: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn web_indexed(mut self, web_indexed: bool) -> Self {
        self.web_indexed = web_indexed;
        self
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.output_folder = folder.into();
        self
    }
}

/// Read-only view of the bundler's outputs at generation time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSnapshot {
    /// Bundles in the bundler's sorted order
    #[serde(default)]
    pub bundles: Vec<BundleOutput>,

    /// Stylesheets injected by the build, in insertion order
    #[serde(default)]
    pub injected_styles: IndexSet<String>,
}

impl BuildSnapshot {
    pub fn new(bundles: Vec<BundleOutput>) -> Self {
        Self {
            bundles,
            injected_styles: IndexSet::new(),
        }
    }

    pub fn with_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for style in styles {
            self.inject_style(style);
        }
        self
    }

    /// Record an injected stylesheet; repeated paths keep their first position
    pub fn inject_style(&mut self, path: impl Into<String>) {
        self.injected_styles.insert(path.into());
    }

    /// Parse a JSON build manifest
    pub fn from_manifest_str(path: &Path, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| WebIndexError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Supplies a fresh snapshot for every generation
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self) -> Result<BuildSnapshot>;
}

#[async_trait]
impl SnapshotSource for BuildSnapshot {
    async fn snapshot(&self) -> Result<BuildSnapshot> {
        Ok(self.clone())
    }
}

#[async_trait]
impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    async fn snapshot(&self) -> Result<BuildSnapshot> {
        (**self).snapshot().await
    }
}

/// Snapshot shared with the build driver, replaced after every build
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<BuildSnapshot>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: BuildSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Replace the current snapshot
    pub fn replace(&self, snapshot: BuildSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// Mutate the current snapshot in place
    pub fn update(&self, f: impl FnOnce(&mut BuildSnapshot)) {
        let mut guard = self.inner.write();
        f(&mut *guard);
    }
}

#[async_trait]
impl SnapshotSource for SharedSnapshot {
    async fn snapshot(&self) -> Result<BuildSnapshot> {
        Ok(self.inner.read().clone())
    }
}

/// Reads a JSON build manifest from disk on every call
///
/// ```json
/// {
///   "bundles": [
///     { "name": "vendor", "outputFilename": "vendor.js" },
///     { "name": "app", "outputFolder": "js", "outputFilename": "app.js" },
///     { "name": "lazy", "webIndexed": false, "outputFilename": "lazy.js" }
///   ],
///   "injectedStyles": ["styles.css"]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ManifestSnapshot {
    path: PathBuf,
}

impl ManifestSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for ManifestSnapshot {
    async fn snapshot(&self) -> Result<BuildSnapshot> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| WebIndexError::Manifest {
                    path: self.path.clone(),
                    message: e.to_string(),
                })?;
        BuildSnapshot::from_manifest_str(&self.path, &content)
    }
}
