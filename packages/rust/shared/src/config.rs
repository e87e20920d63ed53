//! Application configuration for roamgraph.
//!
//! User config lives at `~/.roamgraph/roamgraph.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, RoamGraphError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "roamgraph.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".roamgraph";

// ---------------------------------------------------------------------------
// Config structs (matching roamgraph.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which graph to read and how it is named in links.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Click-link settings.
    #[serde(default)]
    pub links: LinksConfig,

    /// Where and how the diagram is written back.
    #[serde(default)]
    pub render: RenderSection,
}

/// `[graph]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Graph name, used in node click links.
    #[serde(default = "default_graph_name")]
    pub name: String,

    /// Path to the outline export (JSON).
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: default_graph_name(),
            outline: default_outline(),
        }
    }
}

fn default_graph_name() -> String {
    "my-graph".into()
}
fn default_outline() -> String {
    "roam-export.json".into()
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// App URL that `<graph>/page/<uid>` is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://roamresearch.com/#/app".into()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSection {
    /// Attribute name of the block the diagram is stored under (without `::`).
    #[serde(default = "default_attribute")]
    pub attribute: String,

    /// Open the diagram block in the sidebar when no window is open yet.
    #[serde(default = "default_true")]
    pub open_in_sidebar: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            attribute: default_attribute(),
            open_in_sidebar: true,
        }
    }
}

fn default_attribute() -> String {
    "roam/js/roam-graph".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Render config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime render configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Graph name placed in click links.
    pub graph_name: String,
    /// Link base without a trailing slash.
    pub link_base: String,
    /// Attribute block name (without `::`).
    pub attribute: String,
    /// Whether to open the diagram in the sidebar.
    pub open_in_sidebar: bool,
}

impl RenderConfig {
    /// Build and validate the runtime config from the file config.
    pub fn from_app(config: &AppConfig) -> Result<Self> {
        Self {
            graph_name: config.graph.name.clone(),
            link_base: config.links.base_url.trim_end_matches('/').to_string(),
            attribute: config.render.attribute.clone(),
            open_in_sidebar: config.render.open_in_sidebar,
        }
        .validated()
    }

    /// Replace the graph name (e.g. from a `--graph` flag).
    pub fn with_graph_name(mut self, name: impl Into<String>) -> Result<Self> {
        self.graph_name = name.into();
        self.validated()
    }

    /// Text of the attribute block, e.g. `roam/js/roam-graph::`.
    pub fn attribute_text(&self) -> String {
        format!("{}::", self.attribute)
    }

    fn validated(self) -> Result<Self> {
        if self.graph_name.trim().is_empty() {
            return Err(RoamGraphError::config("graph name is empty"));
        }
        if self.attribute.trim().is_empty() {
            return Err(RoamGraphError::config("render attribute is empty"));
        }
        Url::parse(&self.link_base).map_err(|e| {
            RoamGraphError::config(format!("invalid links.base_url '{}': {e}", self.link_base))
        })?;
        Ok(self)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            graph_name: default_graph_name(),
            link_base: default_base_url(),
            attribute: default_attribute(),
            open_in_sidebar: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.roamgraph/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RoamGraphError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.roamgraph/roamgraph.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RoamGraphError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RoamGraphError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_file_path()?)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| RoamGraphError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| RoamGraphError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| RoamGraphError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("roam/js/roam-graph"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[graph]
name = "work"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.graph.name, "work");
        assert_eq!(config.graph.outline, "roam-export.json");
        assert_eq!(config.links.base_url, "https://roamresearch.com/#/app");
        assert!(config.render.open_in_sidebar);
    }

    #[test]
    fn render_config_from_app_config() {
        let mut app = AppConfig::default();
        app.links.base_url = "https://example.com/app/".into();
        let render = RenderConfig::from_app(&app).expect("valid");
        assert_eq!(render.link_base, "https://example.com/app");
        assert_eq!(render.graph_name, "my-graph");
        assert_eq!(render.attribute_text(), "roam/js/roam-graph::");
    }

    #[test]
    fn graph_override_is_validated() {
        let render = RenderConfig::default();
        let render = render.with_graph_name("other").expect("valid");
        assert_eq!(render.graph_name, "other");
        assert!(render.with_graph_name("  ").is_err());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut app = AppConfig::default();
        app.links.base_url = "not a url".into();
        let err = RenderConfig::from_app(&app).unwrap_err();
        assert!(err.to_string().contains("invalid links.base_url"));
    }

    #[test]
    fn init_then_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("rg_cfg_{}", std::process::id()))
            .join("roamgraph.toml");
        init_config_at(&path).expect("init");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.render.attribute, "roam/js/roam-graph");
        let _ = std::fs::remove_file(&path);
    }
}
