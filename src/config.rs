use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub storage: StorageConfig,

    #[command(flatten)]
    pub regex: RegexConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "REGEXLAB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "REGEXLAB_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the management endpoints (health probes)
    #[arg(long, env = "REGEXLAB_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for background tasks to finish on shutdown
    #[arg(long, env = "REGEXLAB_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Largest accepted request body in bytes
    #[arg(long, env = "REGEXLAB_MAX_BODY_BYTES", default_value_t = 65_536)]
    pub max_body_bytes: usize,
}

#[derive(Clone, Debug, Args)]
pub struct StorageConfig {
    /// Directory holding one JSON file per share
    #[arg(long = "storage-dir", env = "REGEXLAB_STORAGE_DIR", default_value = "./shared_regexes")]
    pub dir: PathBuf,

    /// How often to sweep expired shares from disk
    #[arg(long, env = "REGEXLAB_SWEEP_INTERVAL_SECS", default_value_t = 3600)]
    pub sweep_interval_secs: u64,

    /// Scheme used to generate share ids
    #[arg(long, env = "REGEXLAB_ID_SCHEME", value_enum, default_value_t = IdScheme::ClockDigest)]
    pub id_scheme: IdScheme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum IdScheme {
    /// Truncated SHA-256 of the current timestamp
    ClockDigest,
    /// Random URL-safe token
    Random,
}

#[derive(Clone, Debug, Args)]
pub struct RegexConfig {
    /// Upper bound on the compiled size of a pattern, in bytes. Defaults to the regex engine's own limit.
    #[arg(long = "regex-size-limit", env = "REGEXLAB_REGEX_SIZE_LIMIT", default_value_t = 10 * (1 << 20))]
    pub size_limit: usize,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the storage readiness check
    #[arg(long, env = "REGEXLAB_HEALTH_STORAGE_TIMEOUT_MS", default_value_t = 2000)]
    pub storage_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP collector endpoint. Traces and metrics are only exported when set.
    #[arg(long, env = "REGEXLAB_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "REGEXLAB_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, env = "REGEXLAB_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["regexlab-server"]).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.sweep_interval_secs, 3600);
        assert_eq!(config.storage.id_scheme, IdScheme::ClockDigest);
        assert_eq!(config.storage.dir, PathBuf::from("./shared_regexes"));
        assert_eq!(config.telemetry.log_format, LogFormat::Text);
        assert_eq!(config.regex.size_limit, 10 * (1 << 20));
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "regexlab-server",
            "--storage-dir",
            "/tmp/shares",
            "--id-scheme",
            "random",
            "--sweep-interval-secs",
            "60",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.storage.dir, PathBuf::from("/tmp/shares"));
        assert_eq!(config.storage.id_scheme, IdScheme::Random);
        assert_eq!(config.storage.sweep_interval_secs, 60);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }
}
