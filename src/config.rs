//! Environment-driven settings. `.env` is loaded first via `dotenv`, then variables are read.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::pipeline::PipelineConfig;
use crate::youtube::DEFAULT_API_BASE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// HTTP model sidecar.
    Sidecar,
    /// Offline word lists.
    Lexicon,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base: String,
    pub backend: BackendKind,
    pub ml_service_url: String,
    pub translate_languages: HashSet<String>,
    pub default_language: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => compose_database_url(&get)?,
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: raw,
            })?,
            None => 5,
        };

        let ml_url = get("ML_SERVICE_URL");
        let backend = match get("NLP_BACKEND").map(|s| s.to_lowercase()).as_deref() {
            Some("sidecar") => BackendKind::Sidecar,
            Some("lexicon") => BackendKind::Lexicon,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "NLP_BACKEND",
                    value: other.to_string(),
                })
            }
            None if ml_url.is_some() => BackendKind::Sidecar,
            None => BackendKind::Lexicon,
        };

        let translate_languages = match get("TRANSLATE_LANGUAGES") {
            Some(raw) => parse_language_set(&raw),
            None => PipelineConfig::default().translate_languages,
        };

        Ok(Self {
            database_url,
            db_max_connections,
            youtube_api_key: get("YOUTUBE_API_KEY"),
            youtube_api_base: get("YOUTUBE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            backend,
            ml_service_url: ml_url.unwrap_or_else(|| "http://localhost:8000".to_string()),
            translate_languages,
            default_language: get("DEFAULT_LANGUAGE")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "en".to_string()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }

    /// The ingestion endpoint cannot run without an API key.
    pub fn require_youtube_key(&self) -> Result<&str, ConfigError> {
        self.youtube_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("YOUTUBE_API_KEY"))
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            translate_languages: self.translate_languages.clone(),
            default_language: self.default_language.clone(),
        }
    }
}

fn compose_database_url<G>(get: &G) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let user = get("DB_USER").ok_or(ConfigError::Missing("DATABASE_URL"))?;
    let host = get("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = get("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let name = get("DB_NAME").unwrap_or_else(|| "creator_insight".to_string());
    let auth = match get("DB_PASS") {
        Some(pass) => format!("{user}:{pass}"),
        None => user,
    };
    Ok(format!("postgres://{auth}@{host}:{port}/{name}"))
}

/// Parses a comma separated language list ("hi, ur" -> {"hi", "ur"}).
pub fn parse_language_set(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/db")]).unwrap();
        assert_eq!(cfg.backend, BackendKind::Lexicon);
        assert_eq!(cfg.default_language, "en");
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert!(cfg.translate_languages.contains("hi"));
        assert!(cfg.translate_languages.contains("ur"));
        assert_eq!(cfg.require_youtube_key(), Err(ConfigError::Missing("YOUTUBE_API_KEY")));
    }

    #[test]
    fn test_missing_database_is_fatal() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_database_url_from_parts() {
        let cfg = config(&[
            ("DB_HOST", "db"),
            ("DB_USER", "app"),
            ("DB_PASS", "secret"),
            ("DB_NAME", "insight"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://app:secret@db:5432/insight");
    }

    #[test]
    fn test_sidecar_selected_when_url_present() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("ML_SERVICE_URL", "http://ml:8000"),
            ("TRANSLATE_LANGUAGES", "HI, bn,,"),
        ])
        .unwrap();
        assert_eq!(cfg.backend, BackendKind::Sidecar);
        assert_eq!(cfg.ml_service_url, "http://ml:8000");
        let expected: HashSet<String> = ["hi", "bn"].iter().map(|s| s.to_string()).collect();
        assert_eq!(cfg.translate_languages, expected);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = config(&[("DATABASE_URL", "x"), ("NLP_BACKEND", "gpt")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "NLP_BACKEND", .. }));
        let err = config(&[("DATABASE_URL", "x"), ("DB_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. }));
    }
}
