// src/config.rs

use crate::core::gateway::http_gateway::Credentials;
use crate::core::models::CheckOptions;
use crate::core::orchestrator::PollSettings;
use crate::logging::get_config_dir;
use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "NETCHECK_DASHBOARD_API_URL";
pub const ENV_TOKEN: &str = "NETCHECK_DASHBOARD_TOKEN";
pub const ENV_UID: &str = "NETCHECK_DASHBOARD_UID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub retry_delay_ms: u64,
    pub max_retries: u32,
    pub debounce_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { retry_delay_ms: 1500, max_retries: 10, debounce_ms: 300 }
    }
}

/// Everything the dashboard reads at startup. Every field has a default,
/// so a partial `config.json` is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub session_token: Option<String>,
    pub session_uid: Option<String>,
    pub request_timeout_secs: u64,
    pub polling: PollingConfig,
    pub check_options: CheckOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.lvalue.dev".to_string(),
            session_token: None,
            session_uid: None,
            request_timeout_secs: 15,
            polling: PollingConfig::default(),
            check_options: CheckOptions::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        get_config_dir().join(CONFIG_FILE)
    }

    /// Loads `config.json` from the config dir, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::config_path())?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults.");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Malformed config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded config file.");
        Ok(settings)
    }

    /// Overrides from the environment; `lookup` is `std::env::var` outside of tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.session_token = Some(token);
        }
        if let Some(uid) = non_empty(ENV_UID) {
            self.session_uid = Some(uid);
        }
    }

    /// Login headers are only sent when both halves are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.session_token, &self.session_uid) {
            (Some(token), Some(uid)) => Some(Credentials { token: token.clone(), uid: uid.clone() }),
            _ => None,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            retry_delay: Duration::from_millis(self.polling.retry_delay_ms),
            max_retries: self.polling.max_retries,
            debounce: Duration::from_millis(self.polling.debounce_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_settings(), PollSettings::default());
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_base_url": "http://localhost:8000", "polling": {{"max_retries": 3}}, "check_options": {{"ping_count": 8}}}}"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.polling.max_retries, 3);
        assert_eq!(settings.polling.retry_delay_ms, 1500);
        assert_eq!(settings.check_options.ping_count, 8);
        assert_eq!(settings.check_options.traceroute_max_hops, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Malformed config file"));
    }

    #[test]
    fn environment_overrides_the_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://staging.example.test"),
            (ENV_TOKEN, "token-123"),
            (ENV_UID, "  "),
        ]);
        let mut settings = Settings { session_uid: Some("uid-from-file".into()), ..Settings::default() };
        settings.apply_env(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(settings.api_base_url, "https://staging.example.test");
        assert_eq!(settings.session_token.as_deref(), Some("token-123"));
        assert_eq!(settings.session_uid.as_deref(), Some("uid-from-file"));
        assert_eq!(
            settings.credentials(),
            Some(Credentials { token: "token-123".into(), uid: "uid-from-file".into() })
        );
    }

    #[test]
    fn credentials_need_both_halves() {
        let settings = Settings { session_token: Some("t".into()), ..Settings::default() };
        assert_eq!(settings.credentials(), None);
    }
}
