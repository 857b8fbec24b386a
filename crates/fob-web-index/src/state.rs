//! Template state assembly.

use indexmap::IndexMap;
use serde::Serialize;

/// State key holding the ordered script markup
pub const SCRIPT_KEY: &str = "script";

/// State key holding the ordered stylesheet markup
pub const CSS_KEY: &str = "css";

/// Flat key/value state handed to the template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateState(IndexMap<String, String>);

impl TemplateState {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn script(&self) -> &str {
        self.get(SCRIPT_KEY).unwrap_or_default()
    }

    pub fn css(&self) -> &str {
        self.get(CSS_KEY).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Merge computed markup with caller overrides.
///
/// The built-in keys go in first and overrides are applied after them, so an
/// override named `script` or `css` replaces the computed markup. Overrides
/// whose value is `None` are skipped and never erase an existing key.
pub fn assemble(
    script_markup: String,
    css_markup: String,
    overrides: &IndexMap<String, Option<String>>,
) -> TemplateState {
    let mut state = TemplateState::default();
    state.insert(SCRIPT_KEY, script_markup);
    state.insert(CSS_KEY, css_markup);

    for (key, value) in overrides {
        if let Some(value) = value {
            state.insert(key.as_str(), value.as_str());
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_always_present() {
        let state = assemble(String::new(), String::new(), &IndexMap::new());
        assert_eq!(state.get(SCRIPT_KEY), Some(""));
        assert_eq!(state.get(CSS_KEY), Some(""));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn override_replaces_builtin_key() {
        let mut overrides = IndexMap::new();
        overrides.insert("script".to_string(), Some("<!-- none -->".to_string()));
        overrides.insert("title".to_string(), Some("Custom Title".to_string()));

        let state = assemble("<script></script>".into(), "<link>".into(), &overrides);
        assert_eq!(state.script(), "<!-- none -->");
        assert_eq!(state.css(), "<link>");
        assert_eq!(state.get("title"), Some("Custom Title"));
    }

    #[test]
    fn absent_override_does_not_erase() {
        let mut overrides = IndexMap::new();
        overrides.insert("css".to_string(), None);
        overrides.insert("lang".to_string(), None);

        let state = assemble("s".into(), "c".into(), &overrides);
        assert_eq!(state.css(), "c");
        assert_eq!(state.get("lang"), None);
    }

    #[test]
    fn serializes_as_flat_map() {
        let state = assemble("s".into(), "c".into(), &IndexMap::new());
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"script":"s","css":"c"}"#);
    }
}
