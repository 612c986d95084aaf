//! Process configuration read from the environment (and `.env`, if present).

use std::fmt;
use std::net::SocketAddr;

use anyhow::{Context, bail};
use chrono::Duration;
use dotenvy::dotenv;
use tracing::warn;

use sweetshop_auth::{AuthConfig, DEFAULT_TOKEN_TTL_MINUTES};
use sweetshop_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_APP_NAME: &str = "Sweet Shop Management System";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub app_name: String,
    pub auth: AuthConfig,
    /// `None` selects the in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub admin: Option<AdminBootstrap>,
    pub seed_demo_data: bool,
    pub log_format: LogFormat,
    /// Set when `JWT_SECRET` was missing and the dev default is in use.
    pub insecure_jwt_secret: bool,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Credentials for the ADMIN account created at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        let (jwt_secret, insecure_jwt_secret) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let ttl_minutes: i64 = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        if ttl_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than zero");
        }

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: match get("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => raw
                        .trim()
                        .parse::<u32>()
                        .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
                    None => DEFAULT_MAX_CONNECTIONS,
                },
            }),
            None => None,
        };

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                password,
                name: get("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
            }),
            _ => None,
        };

        let seed_demo_data = match get("SEED_DEMO_DATA") {
            Some(raw) => parse_bool(&raw).context("SEED_DEMO_DATA must be true or false")?,
            None => false,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
            None => LogFormat::default(),
        };

        Ok(AppConfig {
            bind_addr,
            app_name: get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            auth: AuthConfig::new(jwt_secret).with_token_ttl(Duration::minutes(ttl_minutes)),
            database,
            admin,
            seed_demo_data,
            log_format,
            insecure_jwt_secret,
        })
    }

    /// Emit warnings about risky settings. Call once logging is up.
    pub fn log_warnings(&self) {
        if self.insecure_jwt_secret {
            warn!("JWT_SECRET not set; using insecure dev default");
        }
        if self.database.is_none() {
            warn!("DATABASE_URL not set; data lives in memory and is lost on exit");
        }
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.app_name, DEFAULT_APP_NAME);
        assert_eq!(cfg.auth.token_ttl, Duration::minutes(30));
        assert!(cfg.insecure_jwt_secret);
        assert!(cfg.database.is_none());
        assert!(cfg.admin.is_none());
        assert!(!cfg.seed_demo_data);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("DATABASE_URL", "postgres://localhost/sweets"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "pw"),
            ("SEED_DEMO_DATA", "true"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert!(!cfg.insecure_jwt_secret);
        assert_eq!(cfg.auth.token_ttl, Duration::minutes(5));
        assert_eq!(cfg.database.as_ref().map(|d| d.max_connections), Some(12));
        assert_eq!(cfg.admin.as_ref().map(|a| a.name.as_str()), Some("Administrator"));
        assert!(cfg.seed_demo_data);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        assert!(config(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]).is_err());
        assert!(config(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "-5")]).is_err());
        assert!(config(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "soon")]).is_err());
    }

    #[test]
    fn admin_requires_both_email_and_password() {
        let cfg = config(&[("ADMIN_EMAIL", "root@example.com")]).unwrap();
        assert!(cfg.admin.is_none());
    }

    #[test]
    fn secrets_stay_out_of_debug_output() {
        let cfg = config(&[
            ("JWT_SECRET", "top-secret-value"),
            ("DATABASE_URL", "postgres://user:hunter2@db/sweets"),
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "admin-password"),
        ])
        .unwrap();

        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("top-secret-value"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("admin-password"));
    }
}
