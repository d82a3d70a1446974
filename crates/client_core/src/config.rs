use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:32100";
pub const SETTINGS_FILE: &str = "console.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported base url scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
}

/// Connection settings handed to every transport at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let base_url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            url: trimmed.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        Ok(Self { base_url })
    }

    /// Resolves an API path against the base url. Query params are passed
    /// through already formatted as `key=value`.
    pub fn endpoint(&self, path: &str, params: &[String]) -> Url {
        let mut url = self.base_url.clone();
        let prefix = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{path}"));
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&params.join("&")));
        }
        url
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    base_url: Option<String>,
}

/// Layers the base url from `console.toml`, then `CONSOLE_BASE_URL`, then
/// `APP__BASE_URL`, then the command-line override.
pub fn load_settings(cli_base_url: Option<&str>) -> Result<ClientConfig, ConfigError> {
    let file = fs::read_to_string(Path::new(SETTINGS_FILE)).ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok(), cli_base_url)
}

fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    cli_base_url: Option<&str>,
) -> Result<ClientConfig, ConfigError> {
    let mut base_url = DEFAULT_BASE_URL.to_string();

    if let Some(raw) = file {
        match toml::from_str::<SettingsFile>(raw) {
            Ok(SettingsFile { base_url: Some(v) }) => base_url = v,
            Ok(SettingsFile { base_url: None }) => {}
            Err(error) => warn!(%error, file = SETTINGS_FILE, "ignoring malformed settings file"),
        }
    }

    if let Some(v) = env("CONSOLE_BASE_URL") {
        base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        base_url = v;
    }
    if let Some(v) = cli_base_url {
        base_url = v.to_string();
    }

    debug!(%base_url, "resolved client settings");
    ClientConfig::new(&base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn falls_back_to_local_default() {
        let config = resolve_settings(None, no_env, None).expect("default");
        assert_eq!(config.base_url.as_str(), "http://localhost:32100/");
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let file = r#"base_url = "http://file.example:1""#;
        let env = |key: &str| match key {
            "CONSOLE_BASE_URL" => Some("http://console.example:2".to_string()),
            _ => None,
        };

        let from_env = resolve_settings(Some(file), env, None).expect("env layer");
        assert_eq!(from_env.base_url.as_str(), "http://console.example:2/");

        let from_cli =
            resolve_settings(Some(file), env, Some("https://cli.example")).expect("cli layer");
        assert_eq!(from_cli.base_url.as_str(), "https://cli.example/");

        let from_file = resolve_settings(Some(file), no_env, None).expect("file layer");
        assert_eq!(from_file.base_url.as_str(), "http://file.example:1/");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let config = resolve_settings(Some("base_url = ["), no_env, None).expect("default");
        assert_eq!(
            config,
            ClientConfig::new(DEFAULT_BASE_URL).expect("default config")
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn endpoint_keeps_base_prefix_and_joins_params() {
        let config = ClientConfig::new("http://host:32100/console/").expect("config");
        assert_eq!(
            config.endpoint("/v1/chamber", &[]).as_str(),
            "http://host:32100/console/v1/chamber"
        );
        assert_eq!(
            config
                .endpoint("/v1/chamber", &["since=3".to_string(), "limit=10".to_string()])
                .as_str(),
            "http://host:32100/console/v1/chamber?since=3&limit=10"
        );
        assert_eq!(
            config.endpoint("/v1/message/", &[]).as_str(),
            "http://host:32100/console/v1/message/"
        );
    }
}
