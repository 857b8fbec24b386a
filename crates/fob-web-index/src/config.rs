//! Serializable web index configuration.
//!
//! [`WebIndexConfig`] is the data-only form of [`WebIndexOptions`] used by
//! config files. Transforms are expressed as [`TagRuleSet`]s and the template
//! can only be a path or the built-in document.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::AssetKind;
use crate::error::Result;
use crate::options::{WebIndexOptions, DEFAULT_OUT_FILE, DEFAULT_PUBLIC_PATH};
use crate::rules::TagRuleSet;
use crate::template::TemplateSource;

fn default_out_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_FILE)
}

fn default_public_path() -> String {
    DEFAULT_PUBLIC_PATH.to_string()
}

/// Per-kind tag rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<TagRuleSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<TagRuleSet>,
}

/// Web index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebIndexConfig {
    /// Output filename, relative to the output directory (default: "index.html")
    #[serde(default = "default_out_file")]
    pub out_file: PathBuf,

    /// URL prefix for asset paths (default: "/")
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Path to a Jinja template; the built-in document is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Directory relative template paths resolve against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Additional template variables; `null` values are ignored
    #[serde(default)]
    pub variables: IndexMap<String, Value>,

    #[serde(default)]
    pub tags: TagsConfig,
}

impl Default for WebIndexConfig {
    fn default() -> Self {
        Self {
            out_file: default_out_file(),
            public_path: default_public_path(),
            template: None,
            root: None,
            variables: IndexMap::new(),
            tags: TagsConfig::default(),
        }
    }
}

impl WebIndexConfig {
    /// Create from serde_json::Value
    ///
    /// # Example
    ///
    /// ```
    /// use fob_web_index::WebIndexConfig;
    /// use serde_json::json;
    ///
    /// let config = WebIndexConfig::from_value(json!({
    ///     "publicPath": "/static",
    ///     "variables": { "title": "Custom Title" }
    /// }))
    /// .unwrap();
    /// assert_eq!(config.public_path, "/static");
    /// ```
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Build runtime options, compiling tag rules
    pub fn into_options(self) -> Result<WebIndexOptions> {
        let variables = self
            .variables
            .into_iter()
            .map(|(key, value)| (key, variable_value(value)))
            .collect();

        let mut options = WebIndexOptions::new()
            .with_out_file(self.out_file)
            .with_public_path(self.public_path)
            .with_variables(variables);

        if let Some(root) = self.root {
            options = options.with_root(root);
        }
        if let Some(template) = self.template {
            options = options.with_template(TemplateSource::Path(template));
        }
        for (kind, rules) in [
            (AssetKind::Script, self.tags.script),
            (AssetKind::Css, self.tags.css),
        ] {
            if let Some(rules) = rules {
                options = options.with_transform(kind, rules.into_transform(kind)?);
            }
        }

        Ok(options)
    }
}

/// Template variables are flat strings; scalars are stringified and `null`
/// becomes an absent value.
fn variable_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
