//! Configuration management module
//!
//! Loads and validates environment-based configuration.

use serde::Deserialize;
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid number format in environment variable {0}")]
    ParseError(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// External scoring and live-data service settings
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScoringSettings {
    /// Base URL of the scoring service
    #[validate(url(message = "SCORING_SERVICE_URL must be a valid URL"))]
    pub base_url: String,
    /// Base URL of the live-data source
    #[validate(url(message = "LIVE_DATA_URL must be a valid URL"))]
    pub live_data_url: String,
    /// Client-side request timeout in milliseconds, 0 disables it
    pub timeout_ms: u64,
}

/// Report export settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    pub location: String,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub scoring: ScoringSettings,
    pub report: ReportSettings,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|_| SettingsError::ParseError("SERVER_PORT"))?;

        let timeout_ms = env::var("SCORING_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .map_err(|_| SettingsError::ParseError("SCORING_TIMEOUT_MS"))?;

        let base_url =
            env::var("SCORING_SERVICE_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".into());
        let live_data_url = env::var("LIVE_DATA_URL").unwrap_or_else(|_| base_url.clone());

        let scoring = ScoringSettings {
            base_url,
            live_data_url,
            timeout_ms,
        };
        scoring
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;

        Ok(Self {
            server: ServerSettings {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                port,
            },
            scoring,
            report: ReportSettings {
                location: env::var("REPORT_LOCATION")
                    .unwrap_or_else(|_| "Ganga River Monitoring Station (Varanasi)".into()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-wide, so every case runs in one test.
    #[test]
    fn test_settings_from_env() {
        for var in [
            "SERVER_HOST",
            "SERVER_PORT",
            "SCORING_SERVICE_URL",
            "LIVE_DATA_URL",
            "SCORING_TIMEOUT_MS",
        ] {
            env::remove_var(var);
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.scoring.base_url, "http://127.0.0.1:5000");
        assert_eq!(settings.scoring.live_data_url, settings.scoring.base_url);
        assert_eq!(settings.scoring.timeout_ms, 30000);

        env::set_var("SERVER_PORT", "3000");
        env::set_var("SCORING_SERVICE_URL", "http://scorer.local:9000");
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.scoring.live_data_url, "http://scorer.local:9000");

        env::set_var("SCORING_SERVICE_URL", "not a url");
        assert!(matches!(Settings::from_env(), Err(SettingsError::Invalid(_))));

        env::set_var("SCORING_SERVICE_URL", "http://scorer.local:9000");
        env::set_var("SCORING_TIMEOUT_MS", "soon");
        assert!(matches!(
            Settings::from_env(),
            Err(SettingsError::ParseError("SCORING_TIMEOUT_MS"))
        ));

        env::remove_var("SERVER_PORT");
        env::remove_var("SCORING_SERVICE_URL");
        env::remove_var("SCORING_TIMEOUT_MS");
    }
}
