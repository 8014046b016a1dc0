use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_BUDGET_LIMIT: &str = "500000";
const DEFAULT_RETRY_LIMIT: i32 = 3;
const DEFAULT_EMAIL_RETRY_INTERVAL_SECS: u64 = 7200;
const DEFAULT_REPORT_RETRY_INTERVAL_SECS: u64 = 600;
const DEFAULT_STALE_PENDING_SECS: i64 = 1800;
const DEFAULT_DAILY_REPORT_INTERVAL_SECS: u64 = 86_400;
const DEFAULT_WEEKLY_REPORT_INTERVAL_SECS: u64 = 604_800;
const DEFAULT_MAIL_FROM: &str = "procurement@example.com";
const DEFAULT_REPORTS_EMAIL: &str = "operations@example.com";

/// Mail transport and notification settings.
#[derive(Clone, Debug, Deserialize)]
pub struct MailConfig {
    /// Resend API key; when unset, outbound email is logged and dropped.
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// Default sender address.
    #[serde(default = "default_mail_from")]
    pub from: String,

    /// Maximum automatic retries before a failed log is left FAILED.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: i32,

    /// Seconds between email retry sweeps.
    #[serde(default = "default_email_retry_interval")]
    pub retry_interval_secs: u64,

    /// A log PENDING longer than this is treated as a crashed attempt
    /// and reconciled to FAILED by the sweep.
    #[serde(default = "default_stale_pending")]
    pub stale_pending_secs: i64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from: default_mail_from(),
            retry_limit: default_retry_limit(),
            retry_interval_secs: default_email_retry_interval(),
            stale_pending_secs: default_stale_pending(),
        }
    }
}

/// Scheduled report settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ReportConfig {
    /// Operations mailbox that receives the scheduled report emails.
    #[serde(default = "default_reports_email")]
    pub email: String,

    /// Maximum automatic retries per report log.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: i32,

    /// Seconds between report retry sweeps.
    #[serde(default = "default_report_retry_interval")]
    pub retry_interval_secs: u64,

    /// Seconds between daily report runs.
    #[serde(default = "default_daily_report_interval")]
    pub daily_interval_secs: u64,

    /// Seconds between weekly report runs.
    #[serde(default = "default_weekly_report_interval")]
    pub weekly_interval_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            email: default_reports_email(),
            retry_limit: default_retry_limit(),
            retry_interval_secs: default_report_retry_interval(),
            daily_interval_secs: default_daily_report_interval(),
            weekly_interval_secs: default_weekly_report_interval(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Serve the Swagger UI at /swagger-ui
    #[serde(default)]
    pub enable_swagger: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Ceiling on a purchase requisition's total amount.
    #[serde(default = "default_budget_limit")]
    pub pr_budget_limit: String,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub reports: ReportConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_budget_limit() -> String {
    DEFAULT_BUDGET_LIMIT.to_string()
}
fn default_mail_from() -> String {
    DEFAULT_MAIL_FROM.to_string()
}
fn default_reports_email() -> String {
    DEFAULT_REPORTS_EMAIL.to_string()
}
fn default_retry_limit() -> i32 {
    DEFAULT_RETRY_LIMIT
}
fn default_email_retry_interval() -> u64 {
    DEFAULT_EMAIL_RETRY_INTERVAL_SECS
}
fn default_report_retry_interval() -> u64 {
    DEFAULT_REPORT_RETRY_INTERVAL_SECS
}
fn default_stale_pending() -> i64 {
    DEFAULT_STALE_PENDING_SECS
}
fn default_daily_report_interval() -> u64 {
    DEFAULT_DAILY_REPORT_INTERVAL_SECS
}
fn default_weekly_report_interval() -> u64 {
    DEFAULT_WEEKLY_REPORT_INTERVAL_SECS
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Budget ceiling as a decimal; falls back to the default on a
    /// malformed configuration value.
    pub fn budget_limit(&self) -> rust_decimal::Decimal {
        self.pr_budget_limit
            .parse()
            .unwrap_or_else(|_| DEFAULT_BUDGET_LIMIT.parse().unwrap())
    }
}

/// Loads configuration from layered sources: `config/default.toml`, an
/// environment-specific file, and `APP__`-prefixed environment variables
/// (e.g. `APP__DATABASE_URL`, `APP__MAIL__RESEND_API_KEY`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder();

    let default_path = Path::new(CONFIG_DIR).join("default.toml");
    if default_path.exists() {
        builder = builder.add_source(File::from(default_path));
    }
    let env_path = Path::new(CONFIG_DIR).join(format!("{environment}.toml"));
    if env_path.exists() {
        builder = builder.add_source(File::from(env_path));
    }

    builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_default("environment", environment)?
        .build()?
        .try_deserialize()
}

/// Initializes the tracing subscriber with an env-filter and optional
/// JSON output.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("procurement_api={level},tower_http=info");
    let filter = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));

    if json {
        let _ = registry.with(fmt::layer().json()).try_init();
    } else {
        let _ = registry.with(fmt::layer()).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn minimal_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            enable_swagger: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            pr_budget_limit: default_budget_limit(),
            mail: MailConfig::default(),
            reports: ReportConfig::default(),
        }
    }

    #[test]
    fn budget_limit_parses() {
        let cfg = minimal_config();
        assert_eq!(cfg.budget_limit(), dec!(500000));
    }

    #[test]
    fn malformed_budget_limit_falls_back_to_default() {
        let mut cfg = minimal_config();
        cfg.pr_budget_limit = "not-a-number".into();
        assert_eq!(cfg.budget_limit(), dec!(500000));
    }

    #[test]
    fn retry_defaults_match_the_documented_ceiling() {
        let cfg = minimal_config();
        assert_eq!(cfg.mail.retry_limit, 3);
        assert_eq!(cfg.reports.retry_limit, 3);
    }
}
