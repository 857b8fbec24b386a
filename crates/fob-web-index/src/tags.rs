//! Tag resolution and fragment ordering.
//!
//! Each classified asset becomes at most one [`TagInfo`]. Without a transform
//! the kind's default markup is used; with one, the transform decides the
//! markup and order key or drops the asset entirely.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{AssetKind, ClassifiedAsset};
use crate::error::{Result, WebIndexError};

/// One markup fragment and its order key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Lower values are emitted first; equal values keep discovery order
    #[serde(default)]
    pub order: i32,
    pub tag: String,
}

impl TagInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            order: 0,
            tag: tag.into(),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

type TransformFn = dyn Fn(&str, &str) -> anyhow::Result<Option<TagInfo>> + Send + Sync;

/// Per-kind transform from `(public_path, display_name)` to an optional tag.
///
/// Returning `Ok(None)` silently excludes the asset. Errors abort the
/// generation.
#[derive(Clone)]
pub struct TagTransform(Arc<TransformFn>);

impl TagTransform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> anyhow::Result<Option<TagInfo>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, public_path: &str, display_name: &str) -> anyhow::Result<Option<TagInfo>> {
        (self.0)(public_path, display_name)
    }
}

impl fmt::Debug for TagTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TagTransform(..)")
    }
}

/// Resolve the fragments for one kind of asset, in discovery order
pub fn resolve_tags(
    kind: AssetKind,
    assets: &[ClassifiedAsset],
    transform: Option<&TagTransform>,
) -> Result<Vec<TagInfo>> {
    let Some(transform) = transform else {
        return Ok(assets
            .iter()
            .map(|asset| TagInfo::new(kind.default_tag(&asset.descriptor.public_path)))
            .collect());
    };

    let mut tags = Vec::with_capacity(assets.len());
    for asset in assets {
        let descriptor = &asset.descriptor;
        match transform
            .call(&descriptor.public_path, &descriptor.display_name)
            .map_err(|e| WebIndexError::transform(kind, &descriptor.display_name, e))?
        {
            Some(info) => tags.push(info),
            None => debug!(%kind, asset = %descriptor.display_name, "transform omitted asset"),
        }
    }
    Ok(tags)
}

/// Stable sort by order key, then concatenate the markup
pub fn order_fragments(mut fragments: Vec<TagInfo>) -> String {
    // sort_by_key is stable, so equal keys keep discovery order
    fragments.sort_by_key(|info| info.order);
    fragments.into_iter().map(|info| info.tag).collect()
}

/// Resolve and order one kind in a single step
pub fn render_tags(
    kind: AssetKind,
    assets: &[ClassifiedAsset],
    transform: Option<&TagTransform>,
) -> Result<String> {
    let fragments = resolve_tags(kind, assets, transform)?;
    debug!(%kind, count = fragments.len(), "resolved tags");
    Ok(order_fragments(fragments))
}
