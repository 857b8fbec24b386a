//! Layered configuration.
//!
//! Priority, lowest to highest:
//!
//! 1. Built-in defaults
//! 2. Config file (`--config`, else `web-index.config.json` or
//!    `web-index.config.toml` in the working directory)
//! 3. `FOB_WEB_INDEX_*` environment variables (`FOB_WEB_INDEX_PUBLIC_PATH`
//!    sets `publicPath`)
//! 4. Command-line flags

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
    value::{Uncased, UncasedStr},
};
use fob_web_index::{WebIndexConfig, WebIndexOptions};
use serde::{Deserialize, Serialize};

use crate::cli::IndexArgs;
use crate::error::{CliError, Result};

pub const CONFIG_FILES: [&str; 2] = ["web-index.config.json", "web-index.config.toml"];
pub const ENV_PREFIX: &str = "FOB_WEB_INDEX_";

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

/// Resolved CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory the document is written to
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(flatten)]
    pub web_index: WebIndexConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            web_index: WebIndexConfig::default(),
        }
    }
}

/// Flags that override config values when given
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<PathBuf>,
}

impl From<&IndexArgs> for FlagOverrides {
    fn from(args: &IndexArgs) -> Self {
        Self {
            out_dir: args.out_dir.clone(),
            out_file: args.out_file.clone(),
            public_path: args.public_path.clone(),
            template: args.template.clone(),
        }
    }
}

impl CliConfig {
    /// Load configuration from all layers, resolving config files against `cwd`
    pub fn load(args: &IndexArgs, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file(args.config.as_deref(), cwd)? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                _ => figment.merge(Json::file(path)),
            };
        }

        figment = figment
            .merge(Env::prefixed(ENV_PREFIX).lowercase(false).map(env_key))
            .merge(Serialized::defaults(FlagOverrides::from(args)));

        Ok(figment.extract()?)
    }

    /// Compile into generator options
    pub fn into_options(self) -> Result<(PathBuf, WebIndexOptions)> {
        let options = self.web_index.into_options()?;
        Ok((self.out_dir, options))
    }
}

fn config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = cwd.join(path);
        if !path.exists() {
            return Err(CliError::FileNotFound(path));
        }
        return Ok(Some(path));
    }

    Ok(CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.exists()))
}

/// `PUBLIC_PATH` -> `publicPath`.
///
/// Keys reach this already stripped of the prefix but not lowercased, so the
/// first segment is lowercased here.
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    let mut camel = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.as_str().chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            camel.extend(ch.to_uppercase());
            upper = false;
        } else {
            camel.extend(ch.to_lowercase());
        }
    }
    Uncased::from_owned(camel)
}
