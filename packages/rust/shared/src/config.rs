//! Application configuration for stagehand.
//!
//! User config lives at `~/.stagehand/stagehand.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StagehandError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "stagehand.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".stagehand";

// ---------------------------------------------------------------------------
// Config structs (matching stagehand.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discovery and preparer defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Content service settings.
    #[serde(default)]
    pub content_service: ContentServiceConfig,

    /// Staging presenter settings (optional integration).
    #[serde(default)]
    pub presenter: PresenterConfig,

    /// GitHub settings (optional integration).
    #[serde(default)]
    pub github: GithubConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Marker file that designates a directory as a content root.
    #[serde(default = "default_marker_file")]
    pub marker_file: String,

    /// Directory names pruned from traversal (build output, staging dirs).
    #[serde(default = "default_reserved_dirs")]
    pub reserved_dirs: Vec<String>,

    /// Command invoked to prepare a single content root.
    #[serde(default = "default_preparer_command")]
    pub preparer_command: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            marker_file: default_marker_file(),
            reserved_dirs: default_reserved_dirs(),
            preparer_command: default_preparer_command(),
        }
    }
}

fn default_marker_file() -> String {
    "_deconst.json".into()
}
fn default_reserved_dirs() -> Vec<String> {
    vec![
        "_build".into(),
        "_site".into(),
        "_deconst".into(),
        "node_modules".into(),
    ]
}
fn default_preparer_command() -> String {
    "stagehand-prepare".into()
}

/// `[content_service]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentServiceConfig {
    /// Base URL of the content-preparation service.
    #[serde(default = "default_content_service_url")]
    pub url: String,

    /// Name of the env var holding the admin API key (never store the key).
    #[serde(default = "default_admin_key_env")]
    pub admin_key_env: String,
}

impl Default for ContentServiceConfig {
    fn default() -> Self {
        Self {
            url: default_content_service_url(),
            admin_key_env: default_admin_key_env(),
        }
    }
}

fn default_content_service_url() -> String {
    "http://localhost:9000".into()
}
fn default_admin_key_env() -> String {
    "CONTENT_SERVICE_ADMIN_APIKEY".into()
}

/// `[presenter]` section. Both fields unset means no presenter is
/// configured and preview URLs are reported as unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Presenter API base URL (where `whereis` lives).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Public base URL that presented paths are joined against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

/// `[github]` section. An unset token env means no GitHub integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Name of the env var holding the GitHub token.
    #[serde(default = "default_github_token_env")]
    pub token_env: String,

    /// GitHub API base URL (overridable for GitHub Enterprise and tests).
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token_env: default_github_token_env(),
            api_url: default_github_api_url(),
        }
    }
}

fn default_github_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_github_api_url() -> String {
    "https://api.github.com".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.stagehand/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StagehandError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.stagehand/stagehand.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| StagehandError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        StagehandError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StagehandError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StagehandError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StagehandError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the content-service admin key env var is set and non-empty,
/// returning its value.
pub fn validate_admin_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.content_service.admin_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(StagehandError::config(format!(
            "content service admin key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("marker_file"));
        assert!(toml_str.contains("CONTENT_SERVICE_ADMIN_APIKEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.marker_file, "_deconst.json");
        assert!(parsed.defaults.reserved_dirs.contains(&"_build".to_string()));
        assert!(parsed.presenter.api_url.is_none());
    }

    #[test]
    fn config_with_presenter() {
        let toml_str = r#"
[content_service]
url = "http://content.svc:9000"

[presenter]
api_url = "http://presenter.svc:8080"
public_url = "https://docs.example.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.content_service.url, "http://content.svc:9000");
        assert_eq!(
            config.presenter.public_url.as_deref(),
            Some("https://docs.example.com")
        );
    }

    #[test]
    fn admin_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.content_service.admin_key_env = "SH_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_admin_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("admin key not found"));
    }
}
