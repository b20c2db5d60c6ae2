//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Outbound email configuration.
    #[serde(default)]
    pub email: EmailSettings,
    /// Intake pipeline defaults.
    #[serde(default)]
    pub intake: IntakeSettings,
    /// Admin authentication.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment.
    pub url: String,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when opening or acquiring a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Log every SQL statement at debug level.
    #[serde(default)]
    pub log_statements: bool,
}

/// Which outbound email provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderKind {
    /// HTTP API provider (Resend-compatible).
    Resend,
    /// Plain SMTP relay.
    Smtp,
    /// Log messages instead of sending them.
    #[default]
    Log,
}

/// Outbound email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    /// Provider used to deliver messages.
    #[serde(default)]
    pub provider: EmailProviderKind,
    /// From address, e.g. `Acreditaciones <acreditaciones@example.com>`.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Reply-to address.
    #[serde(default)]
    pub reply_to: Option<String>,
    /// API key for HTTP providers.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL for HTTP providers.
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    /// SMTP host.
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Signing secret for delivery-status webhooks (`whsec_...`).
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            provider: EmailProviderKind::default(),
            from_address: default_from_address(),
            reply_to: None,
            api_key: None,
            api_url: default_email_api_url(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            webhook_secret: None,
        }
    }
}

/// Area used when the area table cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FallbackArea {
    /// Area code, e.g. `prensa`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Maximum quota per company.
    pub max_quota: i32,
}

/// Intake pipeline defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeSettings {
    /// Event used when no event is active.
    #[serde(default = "default_event_id")]
    pub default_event_id: i32,
    /// Areas substituted when the area table is unreachable.
    #[serde(default = "default_fallback_areas")]
    pub fallback_areas: Vec<FallbackArea>,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            default_event_id: default_event_id(),
            fallback_areas: default_fallback_areas(),
        }
    }
}

/// Admin authentication configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Bearer tokens that identify an administrator.
    #[serde(default)]
    pub admin_tokens: Vec<String>,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "accreditation_server=info,accreditation_api=info,accreditation_core=info,tower_http=info"
        .to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_from_address() -> String {
    "Acreditaciones <acreditaciones@localhost>".to_string()
}

fn default_email_api_url() -> String {
    "https://api.resend.com".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

const fn default_event_id() -> i32 {
    1
}

fn default_fallback_areas() -> Vec<FallbackArea> {
    [
        ("prensa", "Prensa", 10),
        ("fotografia", "Fotografía", 5),
        ("television", "Televisión", 8),
        ("radio", "Radio", 6),
        ("seguridad", "Seguridad", 20),
        ("staff", "Staff", 15),
    ]
    .into_iter()
    .map(|(code, name, max_quota)| FallbackArea {
        code: code.to_string(),
        name: name.to_string(),
        max_quota,
    })
    .collect()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `ACCREDITATION_ENV`)
    /// 3. Environment variables with `ACCREDITATION_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env =
            std::env::var("ACCREDITATION_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ACCREDITATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("ACCREDITATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let raw = r#"
            [server]
            url = "https://acreditaciones.example.com"

            [database]
            url = "postgres://localhost/accreditation"
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.email.provider, EmailProviderKind::Log);
        assert_eq!(config.intake.default_event_id, 1);
        assert!(config.intake.fallback_areas.iter().any(|a| a.code == "prensa"));
        assert!(config.auth.admin_tokens.is_empty());
        assert!(!config.logging.json);
    }

    #[test]
    fn test_fallback_areas_override() {
        let raw = r#"
            [server]
            url = "https://acreditaciones.example.com"

            [database]
            url = "postgres://localhost/accreditation"

            [intake]
            default_event_id = 7

            [[intake.fallback_areas]]
            code = "prensa"
            name = "Prensa"
            max_quota = 3
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.intake.default_event_id, 7);
        assert_eq!(config.intake.fallback_areas.len(), 1);
        assert_eq!(config.intake.fallback_areas[0].max_quota, 3);
    }
}
