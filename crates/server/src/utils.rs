use anyhow::anyhow;
use clap::Parser;
use delivery_fee_core::{resolve_config, ConfigSource, ServiceConfig, DEFAULT_SERVER_PORT};
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Delivery fee server - Weather based delivery fee REST API"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $DELIVERY_FEE_SERVER_CONFIG, ./server.toml,
    /// $XDG_CONFIG_HOME/delivery-fee/server.toml, /etc/delivery-fee/server.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "DELIVERY_FEE_SERVER_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "DELIVERY_FEE_SERVER_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "DELIVERY_FEE_SERVER_PORT")]
    pub port: Option<String>,

    /// Directory for the weather observation database
    #[arg(short, long, env = "DELIVERY_FEE_SERVER_DATA_DIR")]
    pub data_dir: Option<String>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_PORT.to_string())
    }

    pub fn data_dir(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| "./fee_data".to_string())
    }

    /// CLI values win, anything unset falls back to the config file
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file_config.level),
            host: self.host.or(file_config.host),
            port: self.port.or(file_config.port),
            data_dir: self.data_dir.or(file_config.data_dir),
        }
    }
}

impl ServiceConfig for Cli {
    const PATH_ENV: &'static str = "DELIVERY_FEE_SERVER_CONFIG";
    const FILE_NAME: &'static str = "server.toml";

    fn explicit_path(&self) -> Option<&str> {
        self.config.as_deref()
    }

    fn layer_over(self, file: Self) -> Self {
        self.merge(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.host().trim().is_empty() {
            return Err(anyhow!("host must not be empty"));
        }
        let port = self.port();
        match port.trim().parse::<u16>() {
            Ok(0) => Err(anyhow!("port must not be 0")),
            Ok(_) => Ok(()),
            Err(e) => Err(anyhow!("invalid port '{}': {}", port, e)),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> anyhow::Result<(Cli, ConfigSource)> {
    // env vars are handled by clap
    resolve_config(Cli::parse())
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
