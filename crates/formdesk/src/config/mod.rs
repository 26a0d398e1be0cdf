use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub admins: AdminConfig,
    pub notification: Option<NotificationConfig>,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admins: AdminConfig::from_env(),
            notification: NotificationConfig::from_env()?,
            export: ExportConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Externally provisioned set of administrator addresses.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    pub emails: Vec<String>,
}

impl AdminConfig {
    fn from_env() -> Self {
        let emails = env::var("ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { emails }
    }
}

/// SMTP transport and recipient settings for the admin notification.
///
/// Absent entirely when `SMTP_HOST` is unset; the service then falls back to a
/// log-only dispatcher.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub use_tls: bool,
    pub from_address: String,
    pub admin_address: String,
}

impl NotificationConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let smtp_host = match env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => host,
            _ => return Ok(None),
        };

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidSmtpPort)?;

        let admin_address =
            env::var("ADMIN_NOTIFY_EMAIL").map_err(|_| ConfigError::MissingNotifyRecipient)?;

        let use_tls = !matches!(
            env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .trim()
                .to_ascii_lowercase()
                .as_str(),
            "false" | "0" | "off"
        );

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            use_tls,
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "Form Notifications <no-reply@formdesk.local>".to_string()),
            admin_address,
        }))
    }
}

/// Optional spreadsheet webhook target; `None` disables the export bridge.
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    pub webhook_url: Option<String>,
}

impl ExportConfig {
    fn from_env() -> Self {
        let webhook_url = env::var("SHEETS_WEBHOOK_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Self { webhook_url }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSmtpPort,
    MissingNotifyRecipient,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::MissingNotifyRecipient => {
                write!(f, "ADMIN_NOTIFY_EMAIL is required when SMTP_HOST is set")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ADMIN_EMAILS",
            "ADMIN_NOTIFY_EMAIL",
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_USERNAME",
            "SMTP_PASSWORD",
            "SMTP_TLS",
            "SMTP_FROM",
            "SHEETS_WEBHOOK_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.admins.emails.is_empty());
        assert!(config.notification.is_none());
        assert!(config.export.webhook_url.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn admin_emails_are_split_and_trimmed() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMIN_EMAILS", " ada@example.com, ,ops@example.com ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.admins.emails,
            vec!["ada@example.com".to_string(), "ops@example.com".to_string()]
        );
    }

    #[test]
    fn smtp_host_without_recipient_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_HOST", "smtp.example.com");
        match AppConfig::load() {
            Err(ConfigError::MissingNotifyRecipient) => {}
            other => panic!("expected missing recipient error, got {other:?}"),
        }
    }

    #[test]
    fn smtp_settings_round_trip() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_HOST", "smtp.example.com");
        env::set_var("SMTP_PORT", "465");
        env::set_var("SMTP_TLS", "false");
        env::set_var("ADMIN_NOTIFY_EMAIL", "admin@example.com");
        env::set_var("SHEETS_WEBHOOK_URL", "  https://script.example/exec  ");

        let config = AppConfig::load().expect("config loads");
        let notification = config.notification.expect("notification configured");
        assert_eq!(notification.smtp_host, "smtp.example.com");
        assert_eq!(notification.smtp_port, 465);
        assert!(!notification.use_tls);
        assert_eq!(notification.admin_address, "admin@example.com");
        assert_eq!(
            config.export.webhook_url.as_deref(),
            Some("https://script.example/exec")
        );
    }
}
