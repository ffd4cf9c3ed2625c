//! Application configuration for SkillSync.
//!
//! User config lives at `~/.skillsync/skillsync.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillSyncError};
use crate::types::CTID_LEN;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "skillsync.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".skillsync";

/// Length of a registry assistant API key (a bare UUID).
const API_KEY_LEN: usize = 36;

// ---------------------------------------------------------------------------
// Config structs (matching skillsync.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Credential Registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default registry environment: "sandbox" or "production".
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Default language tag for CTDL language maps.
    #[serde(default = "default_language")]
    pub language: String,

    /// Target aggregate rate for skill detail fetches.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Hard ceiling on catalog pages followed via Link headers.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            language: default_language(),
            requests_per_second: default_requests_per_second(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_environment() -> String {
    "sandbox".into()
}
fn default_language() -> String {
    "en-us".into()
}
fn default_requests_per_second() -> u32 {
    20
}
fn default_max_pages() -> u32 {
    10_000
}

/// `[registry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// CTID of the publishing organization, if pinned in config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_ctid: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            organization_ctid: None,
        }
    }
}

fn default_api_key_env() -> String {
    "SKILLSYNC_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Catalog config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime catalog-fetch configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Hard ceiling on pages followed during catalog ingestion.
    pub max_pages: u32,
    /// Target aggregate rate for detail fetches (advisory shaping only).
    pub requests_per_second: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: 30,
        }
    }
}

impl From<&AppConfig> for CatalogConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_pages: config.defaults.max_pages,
            requests_per_second: config.defaults.requests_per_second,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.skillsync/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SkillSyncError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.skillsync/skillsync.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SkillSyncError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SkillSyncError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SkillSyncError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SkillSyncError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SkillSyncError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Credential format checks
// ---------------------------------------------------------------------------

/// Check that an organization CTID has the expected shape.
///
/// Runs before any network call; the message goes straight to the operator.
pub fn validate_org_ctid(ctid: &str) -> Result<()> {
    if ctid.len() != CTID_LEN || !ctid.starts_with("ce-") {
        return Err(SkillSyncError::validation(
            "Please check your organization CTID and try again. \
             Values are expected to look like ce-11111111-aaaa-bbbb-cccc-000000000000.",
        ));
    }
    Ok(())
}

/// Check that a registry API key has the expected shape (a bare UUID).
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.len() != API_KEY_LEN {
        return Err(SkillSyncError::validation(
            "Please check your API key and try again. Values are expected to be UUIDs.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("environment"));
        assert!(toml_str.contains("SKILLSYNC_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.requests_per_second, 20);
        assert_eq!(parsed.defaults.language, "en-us");
        assert_eq!(parsed.registry.api_key_env, "SKILLSYNC_API_KEY");
    }

    #[test]
    fn config_with_pinned_org() {
        let toml_str = r#"
[defaults]
environment = "production"

[registry]
organization_ctid = "ce-9d30f846-dfa4-4b1c-90fa-9d01238a86ac"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.environment, "production");
        assert_eq!(
            config.registry.organization_ctid.as_deref(),
            Some("ce-9d30f846-dfa4-4b1c-90fa-9d01238a86ac")
        );
    }

    #[test]
    fn catalog_config_from_app_config() {
        let app = AppConfig::default();
        let catalog = CatalogConfig::from(&app);
        assert_eq!(catalog.max_pages, 10_000);
        assert_eq!(catalog.requests_per_second, 20);
    }

    #[test]
    fn org_ctid_format() {
        assert!(validate_org_ctid("ce-9d30f846-dfa4-4b1c-90fa-9d01238a86ac").is_ok());
        assert!(validate_org_ctid("9d30f846-dfa4-4b1c-90fa-9d01238a86ac").is_err());
        assert!(validate_org_ctid("ce-short").is_err());
    }

    #[test]
    fn api_key_format() {
        assert!(validate_api_key("11111111-aaaa-bbbb-cccc-000000000000").is_ok());
        let err = validate_api_key("nope").unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
