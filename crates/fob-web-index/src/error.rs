//! Error types for web index generation

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::classify::AssetKind;

pub type Result<T> = std::result::Result<T, WebIndexError>;

/// Errors that can occur while generating the web index document
///
/// Every variant is fatal for the generation that raised it. Nothing is
/// written when generation fails, so the previous document stays on disk.
#[derive(Error, Debug, Diagnostic)]
pub enum WebIndexError {
    /// Template path does not exist
    #[error("template not found: {}", .path.display())]
    #[diagnostic(
        code(fob::web_index::template_not_found),
        help("Check the `template` option; relative paths resolve against the project root")
    )]
    TemplateNotFound { path: PathBuf },

    /// Template path exists but could not be read
    #[error("failed to read template {}: {source}", .path.display())]
    #[diagnostic(code(fob::web_index::template_read))]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template failed to compile or render
    #[error("template '{name}' is not usable: {source}")]
    #[diagnostic(
        code(fob::web_index::template_invalid),
        help("Templates use Jinja syntax; define a `default` macro or render the state directly")
    )]
    TemplateInvalid {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// Inline template function returned an error
    #[error("template function failed: {source}")]
    #[diagnostic(code(fob::web_index::template_failed))]
    TemplateFailed {
        #[source]
        source: anyhow::Error,
    },

    /// A script or css transform returned an error
    #[error("{kind} transform failed for '{asset}': {source}")]
    #[diagnostic(code(fob::web_index::transform_failed))]
    Transform {
        kind: AssetKind,
        asset: String,
        #[source]
        source: anyhow::Error,
    },

    /// Tag rule could not be compiled
    #[error("invalid {kind} tag rule: {message}")]
    #[diagnostic(
        code(fob::web_index::invalid_rule),
        help("Rule patterns are regular expressions matched against the asset filename")
    )]
    InvalidRule { kind: AssetKind, message: String },

    /// Build manifest could not be read or parsed
    #[error("invalid build manifest {}: {message}", .path.display())]
    #[diagnostic(
        code(fob::web_index::manifest),
        help("The manifest is JSON with `bundles` and `injectedStyles` fields")
    )]
    Manifest { path: PathBuf, message: String },

    /// Output path escapes the output directory or is malformed
    #[error("invalid output path: {0}")]
    #[diagnostic(code(fob::web_index::invalid_output_path))]
    InvalidOutputPath(String),

    /// Writing the document failed
    #[error("failed to write {}: {source}", .path.display())]
    #[diagnostic(
        code(fob::web_index::write_failed),
        help("Check output directory permissions")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WebIndexError {
    pub fn transform(kind: AssetKind, asset: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Transform {
            kind,
            asset: asset.into(),
            source,
        }
    }

    pub fn template_invalid(name: impl Into<String>, source: minijinja::Error) -> Self {
        Self::TemplateInvalid {
            name: name.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
