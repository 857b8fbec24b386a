//! Declarative tag rules.
//!
//! Config files cannot hold closures, so a rule list stands in for a
//! transform. Rules are tried in order against the asset's display name and
//! the first match decides the tag.
//!
//! ```toml
//! [tags.script]
//! unmatched = "empty"
//!
//! [[tags.script.rules]]
//! filename = "app.js"
//! order = -1
//!
//! [[tags.script.rules]]
//! pattern = "^vendor"
//! tag = "<script src={path} defer></script>"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::AssetKind;
use crate::error::{Result, WebIndexError};
use crate::tags::{TagInfo, TagTransform};

/// What to do with assets no rule matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unmatched {
    /// Default markup for the kind, order 0
    #[default]
    Default,
    /// An empty tag, order 0
    Empty,
    /// Drop the asset
    Omit,
}

/// A single tag rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRule {
    /// Exact display name to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Regular expression matched against the display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Markup with `{path}` and `{filename}` placeholders; default markup when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default)]
    pub order: i32,

    /// Drop matching assets
    #[serde(default)]
    pub omit: bool,
}

/// Ordered rules for one asset kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRuleSet {
    #[serde(default)]
    pub rules: Vec<TagRule>,

    #[serde(default)]
    pub unmatched: Unmatched,
}

struct CompiledRule {
    filename: Option<String>,
    pattern: Option<Regex>,
    tag: Option<String>,
    order: i32,
    omit: bool,
}

impl CompiledRule {
    fn matches(&self, display_name: &str) -> bool {
        match (&self.filename, &self.pattern) {
            (None, None) => true,
            (filename, pattern) => {
                filename.as_deref() == Some(display_name)
                    || pattern.as_ref().is_some_and(|re| re.is_match(display_name))
            }
        }
    }
}

impl TagRuleSet {
    /// Compile the rules into a transform for `kind`
    pub fn into_transform(self, kind: AssetKind) -> Result<TagTransform> {
        let rules = self
            .rules
            .into_iter()
            .map(|rule| {
                let pattern = rule
                    .pattern
                    .as_deref()
                    .map(Regex::new)
                    .transpose()
                    .map_err(|e| WebIndexError::InvalidRule {
                        kind,
                        message: e.to_string(),
                    })?;
                Ok(CompiledRule {
                    filename: rule.filename,
                    pattern,
                    tag: rule.tag,
                    order: rule.order,
                    omit: rule.omit,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let unmatched = self.unmatched;

        Ok(TagTransform::new(move |path, filename| {
            let Some(rule) = rules.iter().find(|rule| rule.matches(filename)) else {
                return Ok(match unmatched {
                    Unmatched::Default => Some(TagInfo::new(kind.default_tag(path))),
                    Unmatched::Empty => Some(TagInfo::new("")),
                    Unmatched::Omit => None,
                });
            };

            if rule.omit {
                return Ok(None);
            }

            let tag = match &rule.tag {
                Some(template) => expand(template, path, filename),
                None => kind.default_tag(path),
            };
            Ok(Some(TagInfo::new(tag).with_order(rule.order)))
        }))
    }
}

fn expand(template: &str, path: &str, filename: &str) -> String {
    template
        .replace("{path}", path)
        .replace("{filename}", filename)
}
