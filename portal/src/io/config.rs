//! Portal configuration stored in `hr-portal.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::pagination::DEFAULT_PAGE_SIZE;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "HR_PORTAL_API_URL";

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hr-portal.toml";

/// Portal configuration (TOML).
///
/// Missing fields default to values suitable for a local backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PortalConfig {
    pub api: ApiConfig,
    pub list: ListConfig,
}

/// Request settings injected into the API client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend root, e.g. `http://localhost:8080/api`.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            headers: BTreeMap::new(),
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListConfig {
    /// Rows requested per employee page.
    pub page_size: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PortalConfig {
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!(
                "api.base_url must start with http:// or https:// (got {:?})",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be > 0"));
        }
        if self.list.page_size == 0 {
            return Err(anyhow!("list.page_size must be > 0"));
        }
        if let Some(name) = self.api.headers.keys().find(|name| name.trim().is_empty()) {
            return Err(anyhow!("api.headers contains an empty header name {:?}", name));
        }
        Ok(())
    }

    /// Apply a base-URL override (environment or command line).
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Result<Self> {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PortalConfig::default()`.
pub fn load_config(path: &Path) -> Result<PortalConfig> {
    if !path.exists() {
        let cfg = PortalConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PortalConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Load config, then apply `HR_PORTAL_API_URL` and `cli_url` (highest precedence).
pub fn resolve_config(path: &Path, cli_url: Option<String>) -> Result<PortalConfig> {
    resolve_config_with(path, std::env::var(API_URL_ENV).ok(), cli_url)
}

/// [`resolve_config`] with the environment value passed in.
///
/// Only the winning override is validated, so a bad environment value does
/// not block a valid `cli_url`.
pub fn resolve_config_with(
    path: &Path,
    env_url: Option<String>,
    cli_url: Option<String>,
) -> Result<PortalConfig> {
    let non_blank = |url: Option<String>| url.filter(|url| !url.trim().is_empty());
    let base_url = non_blank(cli_url).or_else(|| non_blank(env_url));
    load_config(path)?.with_base_url_override(base_url)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PortalConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, PortalConfig::default());
        assert_eq!(cfg.list.page_size, 10);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("hr-portal.toml");
        let mut cfg = PortalConfig::default();
        cfg.api
            .headers
            .insert("X-Tenant".to_string(), "acme".to_string());
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("hr-portal.toml");
        fs::write(&path, "[api]\nbase_url = \"https://hr.example.com/api\"\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.api.base_url, "https://hr.example.com/api");
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.list, ListConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("hr-portal.toml");
        fs::write(&path, "[list]\npage_size = 0\n").expect("write");
        let err = load_config(&path).expect_err("page_size 0");
        assert!(format!("{err:#}").contains("page_size"));

        let mut cfg = PortalConfig::default();
        cfg.api.base_url = "ftp://nope".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn override_replaces_base_url_and_ignores_blank() {
        let cfg = PortalConfig::default()
            .with_base_url_override(Some("  ".to_string()))
            .expect("blank ignored");
        assert_eq!(cfg.api.base_url, ApiConfig::default().base_url);

        let cfg = cfg
            .with_base_url_override(Some("http://10.0.0.5:9000".to_string()))
            .expect("override");
        assert_eq!(cfg.api.base_url, "http://10.0.0.5:9000");

        assert!(
            PortalConfig::default()
                .with_base_url_override(Some("localhost".to_string()))
                .is_err()
        );
    }

    #[test]
    fn cli_url_wins_over_invalid_env_url() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("hr-portal.toml");

        let cfg = resolve_config_with(
            &path,
            Some("localhost:8080".to_string()),
            Some("http://127.0.0.1:9000".to_string()),
        )
        .expect("cli url is valid");
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:9000");

        let cfg = resolve_config_with(&path, Some("https://hr.example.com".to_string()), None)
            .expect("env url");
        assert_eq!(cfg.api.base_url, "https://hr.example.com");

        let err = resolve_config_with(&path, Some("localhost:8080".to_string()), None)
            .expect_err("env url alone is invalid");
        assert!(err.to_string().contains("localhost:8080"));
    }
}
