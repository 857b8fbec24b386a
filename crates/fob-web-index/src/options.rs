//! Plugin options.
//!
//! Options are built once and then shared read-only by every generation.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::classify::AssetKind;
use crate::tags::{TagInfo, TagTransform};
use crate::state::TemplateState;
use crate::template::TemplateSource;

pub const DEFAULT_OUT_FILE: &str = "index.html";
pub const DEFAULT_PUBLIC_PATH: &str = "/";

/// Web index options
///
/// # Example
///
/// ```
/// use fob_web_index::{TagInfo, WebIndexOptions};
///
/// let options = WebIndexOptions::new()
///     .with_public_path("/static")
///     .script_transform(|path, filename| {
///         let tag = format!("<script src={} defer></script>", path);
///         Ok(Some(if filename == "app.js" {
///             TagInfo::new(tag).with_order(-1)
///         } else {
///             TagInfo::new(tag)
///         }))
///     })
///     .variable("title", "My App");
///
/// assert_eq!(options.out_file().to_str(), Some("index.html"));
/// ```
#[derive(Debug, Clone)]
pub struct WebIndexOptions {
    out_file: PathBuf,
    public_path: String,
    script_transform: Option<TagTransform>,
    css_transform: Option<TagTransform>,
    variables: IndexMap<String, Option<String>>,
    template: TemplateSource,
    root: PathBuf,
}

impl Default for WebIndexOptions {
    fn default() -> Self {
        Self {
            out_file: PathBuf::from(DEFAULT_OUT_FILE),
            public_path: DEFAULT_PUBLIC_PATH.to_string(),
            script_transform: None,
            css_transform: None,
            variables: IndexMap::new(),
            template: TemplateSource::Builtin,
            root: PathBuf::from("."),
        }
    }
}

impl WebIndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output path handed to the writer (default: `index.html`)
    pub fn out_file(&self) -> &std::path::Path {
        &self.out_file
    }

    /// Public base prepended to every asset path (default: `/`)
    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    pub fn transform(&self, kind: AssetKind) -> Option<&TagTransform> {
        match kind {
            AssetKind::Script => self.script_transform.as_ref(),
            AssetKind::Css => self.css_transform.as_ref(),
        }
    }

    pub fn variables(&self) -> &IndexMap<String, Option<String>> {
        &self.variables
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    /// Directory relative template paths resolve against
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn with_out_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_file = path.into();
        self
    }

    pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = public_path.into();
        self
    }

    pub fn script_transform<F>(self, f: F) -> Self
    where
        F: Fn(&str, &str) -> anyhow::Result<Option<TagInfo>> + Send + Sync + 'static,
    {
        self.with_transform(AssetKind::Script, TagTransform::new(f))
    }

    pub fn css_transform<F>(self, f: F) -> Self
    where
        F: Fn(&str, &str) -> anyhow::Result<Option<TagInfo>> + Send + Sync + 'static,
    {
        self.with_transform(AssetKind::Css, TagTransform::new(f))
    }

    pub fn with_transform(mut self, kind: AssetKind, transform: TagTransform) -> Self {
        match kind {
            AssetKind::Script => self.script_transform = Some(transform),
            AssetKind::Css => self.css_transform = Some(transform),
        }
        self
    }

    /// Add a template variable; later values for the same key win
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), Some(value.into()));
        self
    }

    /// Replace all template variables. `None` values are ignored at assembly.
    pub fn with_variables(mut self, variables: IndexMap<String, Option<String>>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_template(mut self, template: TemplateSource) -> Self {
        self.template = template;
        self
    }

    pub fn template_path(self, path: impl Into<PathBuf>) -> Self {
        self.with_template(TemplateSource::Path(path.into()))
    }

    pub fn template_fn<F>(self, f: F) -> Self
    where
        F: Fn(&TemplateState) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.with_template(TemplateSource::inline(f))
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}
