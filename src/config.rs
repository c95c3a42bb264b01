/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, ACCEPTED_CREDENTIALS, VALIDATION_MODE など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::authz::{AcceptedCredentials, SuccessContext, ValidationMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Loaded once; a real deployment would source these from a secret store.
    pub accepted_credentials: AcceptedCredentials,
    pub validation_mode: ValidationMode,
    pub success_context: SuccessContext,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let accepted_credentials =
            parse_credentials(&std::env::var("ACCEPTED_CREDENTIALS").unwrap_or_default());

        let validation_mode = match std::env::var("VALIDATION_MODE") {
            Ok(v) => v
                .parse::<ValidationMode>()
                .map_err(|_| ConfigError::Invalid("VALIDATION_MODE"))?,
            Err(_) => ValidationMode::default(),
        };

        require_credentials(app_env, validation_mode, &accepted_credentials)?;

        let defaults = SuccessContext::default();
        let success_context = SuccessContext {
            principal_id: std::env::var("PRINCIPAL_ID").unwrap_or(defaults.principal_id),
            username: std::env::var("PRINCIPAL_USERNAME").unwrap_or(defaults.username),
        };

        let request_timeout_ms = match std::env::var("REQUEST_TIMEOUT_MS") {
            Ok(v) => v
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_MS"))?,
            Err(_) => 3000,
        };

        Ok(Self {
            addr,
            app_env,
            accepted_credentials,
            validation_mode,
            success_context,
            request_timeout: Duration::from_millis(request_timeout_ms),
        })
    }
}

/// Comma-separated list; entries are trimmed and empties dropped.
fn parse_credentials(raw: &str) -> AcceptedCredentials {
    AcceptedCredentials::new(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty()),
    )
}

/// Production refuses to start with an allowlist that can never match.
fn require_credentials(
    app_env: AppEnv,
    mode: ValidationMode,
    credentials: &AcceptedCredentials,
) -> Result<(), ConfigError> {
    if app_env.is_production() && mode == ValidationMode::Allowlist && credentials.is_empty() {
        return Err(ConfigError::Missing("ACCEPTED_CREDENTIALS"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_list_is_trimmed_and_filtered() {
        let set = parse_credentials(" a, b ,,c ,");
        assert_eq!(set.len(), 3);
        assert!(set.contains("a"));
        assert!(set.contains("b"));
        assert!(set.contains("c"));
        assert!(!set.contains(""));
    }

    #[test]
    fn empty_credentials_list_is_empty_set() {
        assert!(parse_credentials("").is_empty());
        assert!(parse_credentials(" , ").is_empty());
    }

    #[test]
    fn app_env_parses() {
        assert!(AppEnv::parse("PROD").is_production());
        assert!(AppEnv::parse("production").is_production());
        assert!(!AppEnv::parse("staging").is_production());
    }

    #[test]
    fn production_allowlist_requires_credentials() {
        let empty = AcceptedCredentials::default();
        let err = require_credentials(AppEnv::Production, ValidationMode::Allowlist, &empty)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ACCEPTED_CREDENTIALS")));
        assert_eq!(err.to_string(), "missing configuration: ACCEPTED_CREDENTIALS");
    }

    #[test]
    fn empty_allowlist_is_tolerated_outside_production() {
        let empty = AcceptedCredentials::default();
        assert!(require_credentials(AppEnv::Development, ValidationMode::Allowlist, &empty).is_ok());
        assert!(
            require_credentials(AppEnv::Production, ValidationMode::AllowIfPresent, &empty).is_ok()
        );
        let one = AcceptedCredentials::new(["k"]);
        assert!(require_credentials(AppEnv::Production, ValidationMode::Allowlist, &one).is_ok());
    }
}
