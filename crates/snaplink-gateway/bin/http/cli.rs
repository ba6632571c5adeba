use clap::{Parser, ValueEnum};
use snaplink_shortener::allocator::DEFAULT_MAX_ATTEMPTS;
use snaplink_telemetry::{LogFormat, TelemetryConfig};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SNAPLINK_LISTEN_ADDR";
pub const PORT_ENV: &str = "PORT";
pub const STORAGE_BACKEND_ENV: &str = "SNAPLINK_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SNAPLINK_MYSQL_DSN";
pub const MYSQL_MAX_CONNECTIONS_ENV: &str = "SNAPLINK_MYSQL_MAX_CONNECTIONS";
pub const MAX_ALLOCATION_ATTEMPTS_ENV: &str = "SNAPLINK_MAX_ALLOCATION_ATTEMPTS";
pub const COUNT_RESOLUTIONS_ENV: &str = "SNAPLINK_COUNT_RESOLUTIONS";
pub const LOG_FORMAT_ENV: &str = "SNAPLINK_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SNAPLINK_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MYSQL_MAX_CONNECTIONS: u32 = 10;
pub const SERVICE_NAME: &str = "snaplink-gateway";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snaplink-gateway", about = "HTTP API for the snaplink URL shortener")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Overrides the port of `--listen-addr`.
    #[arg(long, env = PORT_ENV)]
    pub port: Option<u16>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = MYSQL_MAX_CONNECTIONS_ENV,
        default_value_t = DEFAULT_MYSQL_MAX_CONNECTIONS
    )]
    pub mysql_max_connections: u32,

    /// Generate-and-insert rounds before a create request fails.
    #[arg(
        long,
        env = MAX_ALLOCATION_ATTEMPTS_ENV,
        default_value_t = DEFAULT_MAX_ATTEMPTS
    )]
    pub max_allocation_attempts: u32,

    /// Increment the access counter on every successful retrieve.
    #[arg(long, env = COUNT_RESOLUTIONS_ENV)]
    pub count_resolutions: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// OTLP/HTTP traces URL. Span export is off when unset.
    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn socket_addr(&self) -> SocketAddr {
        let mut addr = self.listen_addr;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        addr
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            format: self.log_format.into(),
            otlp_endpoint: self.otlp_endpoint.clone(),
            ..TelemetryConfig::new(SERVICE_NAME)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = CLI::try_parse_from(["gateway"]).unwrap();
        assert_eq!(cli.listen_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.max_allocation_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(!cli.count_resolutions);
    }

    #[test]
    fn port_overrides_listen_addr() {
        let cli =
            CLI::try_parse_from(["gateway", "--listen-addr", "0.0.0.0:8080", "--port", "9000"])
                .unwrap();
        assert_eq!(cli.socket_addr(), "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn mysql_requires_dsn() {
        assert!(CLI::try_parse_from(["gateway", "--storage", "mysql"]).is_err());
        assert!(CLI::try_parse_from([
            "gateway",
            "--storage",
            "mysql",
            "--mysql-dsn",
            "mysql://localhost/snaplink"
        ])
        .is_ok());
    }
}
