//! Asset classification.
//!
//! Turns a [`BuildSnapshot`] into the ordered lists of script and stylesheet
//! assets that are eligible for the web index, computing each asset's public
//! path and display filename.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::BuildSnapshot;

/// The two kinds of asset the index references. Kinds are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Css,
}

impl AssetKind {
    /// Extension re-affixed to every display name of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::Script => ".js",
            AssetKind::Css => ".css",
        }
    }

    /// Markup emitted for an asset of this kind when no transform is configured
    pub fn default_tag(&self, public_path: &str) -> String {
        match self {
            AssetKind::Script => format!(
                "\n<script type=\"text/javascript\" src={} defer></script>",
                public_path
            ),
            AssetKind::Css => format!("<link rel=\"stylesheet\" href=\"{}\">", public_path),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Script => f.write_str("script"),
            AssetKind::Css => f.write_str("css"),
        }
    }
}

/// Public-facing identity of one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Public base joined with the asset's relative path
    pub public_path: String,
    /// Basename with the canonical extension re-affixed
    pub display_name: String,
}

/// One eligible asset, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAsset {
    pub descriptor: AssetDescriptor,
    /// Relative path as produced by the bundler
    pub raw_path: String,
}

/// Eligible assets partitioned by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedAssets {
    pub scripts: Vec<ClassifiedAsset>,
    pub styles: Vec<ClassifiedAsset>,
}

impl ClassifiedAssets {
    pub fn of_kind(&self, kind: AssetKind) -> &[ClassifiedAsset] {
        match kind {
            AssetKind::Script => &self.scripts,
            AssetKind::Css => &self.styles,
        }
    }
}

/// Partition a snapshot into script and stylesheet assets.
///
/// Scripts come from bundles that are web-indexed and have a primary output;
/// styles come from the injected stylesheet set. Both keep snapshot order,
/// which later breaks ties between equal order keys.
pub fn classify(snapshot: &BuildSnapshot, public_base: &str) -> ClassifiedAssets {
    let scripts = snapshot
        .bundles
        .iter()
        .filter(|bundle| bundle.web_indexed)
        .filter_map(|bundle| {
            let filename = bundle.output_filename.as_deref()?;
            let relative = join_public_path(&bundle.output_folder, filename);
            Some(classify_one(AssetKind::Script, relative, public_base))
        })
        .collect();

    let styles = snapshot
        .injected_styles
        .iter()
        .map(|path| classify_one(AssetKind::Css, path.clone(), public_base))
        .collect();

    ClassifiedAssets { scripts, styles }
}

fn classify_one(kind: AssetKind, relative: String, public_base: &str) -> ClassifiedAsset {
    ClassifiedAsset {
        descriptor: AssetDescriptor {
            public_path: join_public_path(public_base, &relative),
            display_name: display_name(&relative, kind),
        },
        raw_path: relative,
    }
}

/// Basename of `path` with the kind's extension stripped (when present) and
/// then re-affixed, so `vendor.js` stays `vendor.js` and `vendor` becomes
/// `vendor.js`. A basename that is only the extension is kept whole, so
/// `.js` becomes `.js.js`.
pub fn display_name(path: &str, kind: AssetKind) -> String {
    let base = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("");
    let ext = kind.extension();
    let stem = base
        .strip_suffix(ext)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(base);
    format!("{}{}", stem, ext)
}

/// Join URL path segments with POSIX semantics.
///
/// An empty side is a no-op, `.` segments are dropped, `..` pops the previous
/// segment, repeated slashes collapse, a leading slash on `base` is kept, and a
/// trailing slash on `relative` is kept.
pub fn join_public_path(base: &str, relative: &str) -> String {
    if base.is_empty() {
        return normalize(relative);
    }
    if relative.is_empty() {
        return normalize(base);
    }
    normalize(&format!("{}/{}", base, relative))
}

fn normalize(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut joined = segments.join("/");
    if absolute {
        joined.insert(0, '/');
    }
    if trailing && !joined.ends_with('/') {
        joined.push('/');
    }
    if joined.is_empty() {
        joined.push('.');
    }
    joined
}
