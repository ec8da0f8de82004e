use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::transform::ResolveOptions;

/// Top-level project configuration loaded from `.apigraph.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiGraphConfig {
    pub input: String,
    pub format: OutputFormat,
    pub resolve: ResolveConfig,
}

impl Default for ApiGraphConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            format: OutputFormat::Yaml,
            resolve: ResolveConfig::default(),
        }
    }
}

/// How the resolved client is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Resolution options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Produce services for tags that operations use without declaring.
    pub include_undeclared_tags: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            include_undeclared_tags: true,
        }
    }
}

impl From<&ResolveConfig> for ResolveOptions {
    fn from(config: &ResolveConfig) -> Self {
        Self {
            include_undeclared_tags: config.include_undeclared_tags,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apigraph.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApiGraphConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ApiGraphConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apigraph configuration
input: openapi.yaml
format: yaml            # yaml | json

resolve:
  include_undeclared_tags: true   # services for tags used but never declared
"#
}
