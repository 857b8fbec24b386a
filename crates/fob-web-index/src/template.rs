//! Document rendering.
//!
//! A [`TemplateSource`] is resolved once per generation into something that
//! can be invoked with the [`TemplateState`]:
//!
//! - `Inline` functions are called directly.
//! - `Path` templates are read from disk and compiled with minijinja. If the
//!   template defines a top-level `default` macro, that macro is called with
//!   the state as its only argument. Otherwise the template itself is rendered
//!   with the state as its context.
//! - `Builtin` uses [`BUILTIN_TEMPLATE`].
//!
//! Auto-escaping is always off because the state values are markup.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{AutoEscape, Environment, Value};
use tracing::debug;

use crate::error::{Result, WebIndexError};
use crate::state::TemplateState;

/// Name of the macro preferred over the template body
pub const DEFAULT_EXPORT: &str = "default";

/// Built-in document: stylesheet markup followed by script markup in `<head>`.
///
/// Honors the optional `lang`, `title`, `head` and `body` state keys.
pub const BUILTIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ lang | default("en") }}">
<head>
    <meta charset="utf-8">
{%- if title %}
    <title>{{ title }}</title>
{%- endif %}
    {{ css }}
    {{ script }}
{%- if head %}
    {{ head }}
{%- endif %}
</head>
<body>
{%- if body %}
    {{ body }}
{%- endif %}
</body>
</html>
"#;

const BUILTIN_NAME: &str = "builtin:index.html";

type TemplateFnInner = dyn Fn(&TemplateState) -> anyhow::Result<String> + Send + Sync;

/// In-process template function
#[derive(Clone)]
pub struct TemplateFn(Arc<TemplateFnInner>);

impl TemplateFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&TemplateState) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, state: &TemplateState) -> anyhow::Result<String> {
        (self.0)(state)
    }
}

impl fmt::Debug for TemplateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TemplateFn(..)")
    }
}

/// Where the document template comes from
#[derive(Debug, Clone, Default)]
pub enum TemplateSource {
    /// Function invoked with the state
    Inline(TemplateFn),
    /// Jinja template file, relative paths resolve against the project root
    Path(PathBuf),
    /// The built-in fallback document
    #[default]
    Builtin,
}

impl TemplateSource {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&TemplateState) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self::Inline(TemplateFn::new(f))
    }
}

/// A template ready to be invoked
#[derive(Debug, Clone)]
pub enum ResolvedTemplate {
    Inline(TemplateFn),
    Jinja { name: String, source: String },
}

impl ResolvedTemplate {
    pub fn builtin() -> Self {
        Self::Jinja {
            name: BUILTIN_NAME.to_string(),
            source: BUILTIN_TEMPLATE.to_string(),
        }
    }

    /// Invoke the template with the assembled state
    pub fn render(&self, state: &TemplateState) -> Result<String> {
        match self {
            ResolvedTemplate::Inline(f) => f
                .call(state)
                .map_err(|source| WebIndexError::TemplateFailed { source }),
            ResolvedTemplate::Jinja { name, source } => render_jinja(name, source, state),
        }
    }
}

/// Resolve a template source, reading path templates from disk
pub async fn resolve_template(source: &TemplateSource, root: &Path) -> Result<ResolvedTemplate> {
    match source {
        TemplateSource::Inline(f) => Ok(ResolvedTemplate::Inline(f.clone())),
        TemplateSource::Builtin => Ok(ResolvedTemplate::builtin()),
        TemplateSource::Path(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            };
            debug!(path = %path.display(), "loading template");

            let source = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => WebIndexError::TemplateNotFound { path: path.clone() },
                    _ => WebIndexError::TemplateRead {
                        path: path.clone(),
                        source: e,
                    },
                })?;

            Ok(ResolvedTemplate::Jinja {
                name: path.display().to_string(),
                source,
            })
        }
    }
}

/// Resolve and render in one step
pub async fn render(state: &TemplateState, source: &TemplateSource, root: &Path) -> Result<String> {
    resolve_template(source, root).await?.render(state)
}

fn render_jinja(name: &str, source: &str, state: &TemplateState) -> Result<String> {
    let invalid = |e: minijinja::Error| WebIndexError::template_invalid(name, e);

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template_owned(name.to_string(), source.to_string())
        .map_err(invalid)?;

    let template = env.get_template(name).map_err(invalid)?;
    let ctx = Value::from_serialize(state);

    let (body, state) = template.render_and_return_state(&ctx).map_err(invalid)?;
    if state.lookup(DEFAULT_EXPORT).is_some() {
        debug!(template = name, "invoking default macro");
        return state
            .call_macro(DEFAULT_EXPORT, &[ctx.clone()])
            .map_err(invalid);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::assemble;
    use indexmap::IndexMap;

    fn state() -> TemplateState {
        let mut overrides = IndexMap::new();
        overrides.insert("title".to_string(), Some("Demo".to_string()));
        assemble(
            "<script src=/app.js></script>".into(),
            "<link href=\"/a.css\">".into(),
            &overrides,
        )
    }

    #[test]
    fn builtin_places_css_before_script_in_head() {
        let html = ResolvedTemplate::builtin().render(&state()).unwrap();
        let head_end = html.find("</head>").unwrap();
        let css = html.find("<link href=\"/a.css\">").unwrap();
        let script = html.find("<script src=/app.js></script>").unwrap();
        assert!(css < script);
        assert!(script < head_end);
        assert!(html.contains("<title>Demo</title>"));
        assert!(html.contains("<html lang=\"en\">"));
    }

    #[test]
    fn builtin_does_not_escape_markup() {
        let html = ResolvedTemplate::builtin().render(&state()).unwrap();
        assert!(!html.contains("&lt;"));
    }

    #[test]
    fn jinja_body_renders_with_state_context() {
        let resolved = ResolvedTemplate::Jinja {
            name: "page.html".into(),
            source: "<title>{{ title }}</title>{{ css }}{{ script }}".into(),
        };
        let html = resolved.render(&state()).unwrap();
        assert_eq!(
            html,
            "<title>Demo</title><link href=\"/a.css\"><script src=/app.js></script>"
        );
    }

    #[test]
    fn default_macro_is_preferred() {
        let resolved = ResolvedTemplate::Jinja {
            name: "page.html".into(),
            source: "ignored body\n{% macro default(state) %}[{{ state.title }}]{{ state.script }}{% endmacro %}".into(),
        };
        let html = resolved.render(&state()).unwrap();
        assert_eq!(html, "[Demo]<script src=/app.js></script>");
    }

    #[test]
    fn body_renders_without_default_macro() {
        let resolved = ResolvedTemplate::Jinja {
            name: "page.html".into(),
            source: "{% macro wrap(x) %}<head>{{ x }}</head>{% endmacro %}{{ wrap(css) }}".into(),
        };
        let html = resolved.render(&state()).unwrap();
        assert_eq!(html, "<head><link href=\"/a.css\"></head>");
    }

    #[test]
    fn syntax_error_is_invalid_template() {
        let resolved = ResolvedTemplate::Jinja {
            name: "broken.html".into(),
            source: "{% if %}".into(),
        };
        assert!(matches!(
            resolved.render(&state()),
            Err(WebIndexError::TemplateInvalid { .. })
        ));
    }

    #[test]
    fn inline_error_is_reported() {
        let resolved = ResolvedTemplate::Inline(TemplateFn::new(|_| anyhow::bail!("nope")));
        assert!(matches!(
            resolved.render(&state()),
            Err(WebIndexError::TemplateFailed { .. })
        ));
    }

    #[tokio::test]
    async fn path_template_resolves_against_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/index.html"), "{{ title }}").unwrap();

        let source = TemplateSource::Path(PathBuf::from("templates/index.html"));
        let html = render(&state(), &source, dir.path()).await.unwrap();
        assert_eq!(html, "Demo");
    }

    #[tokio::test]
    async fn missing_path_template_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = TemplateSource::Path(PathBuf::from("missing.html"));
        let err = render(&state(), &source, dir.path()).await.unwrap_err();
        assert!(matches!(err, WebIndexError::TemplateNotFound { .. }));
    }
}
