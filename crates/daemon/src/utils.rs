use anyhow::{anyhow, Error};
use clap::Parser;
use delivery_fee_core::{
    resolve_config, ConfigSource, ServiceConfig, DEFAULT_FETCH_INTERVAL, DEFAULT_SERVER_PORT,
};
use reqwest::{Client, Url};
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use slog::{debug, o, Drain, Level, Logger};
use std::{env, time::Duration};

/// Public observations feed of the Estonian Environment Agency
pub const DEFAULT_FEED_URL: &str = "https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php";

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Delivery fee daemon - Fetches weather observations and uploads them to the server"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $DELIVERY_FEE_DAEMON_CONFIG, ./daemon.toml,
    /// $XDG_CONFIG_HOME/delivery-fee/daemon.toml, /etc/delivery-fee/daemon.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "DELIVERY_FEE_DAEMON_LEVEL")]
    pub level: Option<String>,

    /// Server URL to upload observations to
    #[arg(short, long, env = "DELIVERY_FEE_DAEMON_BASE_URL")]
    pub base_url: Option<String>,

    /// URL of the XML observations feed
    #[arg(short, long, env = "DELIVERY_FEE_DAEMON_FEED_URL")]
    pub feed_url: Option<String>,

    /// Fetch interval in seconds (the feed updates hourly)
    #[arg(short, long, env = "DELIVERY_FEE_DAEMON_SLEEP_INTERVAL")]
    pub sleep_interval: Option<u64>,

    /// HTTP User-Agent header for feed requests
    #[arg(short, long, env = "DELIVERY_FEE_DAEMON_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", DEFAULT_SERVER_PORT))
    }

    pub fn feed_url(&self) -> String {
        self.feed_url
            .clone()
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string())
    }

    /// Period between two feed fetches, a zero period is rejected
    pub fn fetch_interval(&self) -> Result<Duration, Error> {
        match self.sleep_interval.unwrap_or(DEFAULT_FETCH_INTERVAL) {
            0 => Err(anyhow!("sleep_interval must be at least 1 second")),
            seconds => Ok(Duration::from_secs(seconds)),
        }
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| "delivery-fee-daemon/1.0".to_string())
    }

    /// CLI values win, anything unset falls back to the config file
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file_config.level),
            base_url: self.base_url.or(file_config.base_url),
            feed_url: self.feed_url.or(file_config.feed_url),
            sleep_interval: self.sleep_interval.or(file_config.sleep_interval),
            user_agent: self.user_agent.or(file_config.user_agent),
        }
    }
}

impl ServiceConfig for Cli {
    const PATH_ENV: &'static str = "DELIVERY_FEE_DAEMON_CONFIG";
    const FILE_NAME: &'static str = "daemon.toml";

    fn explicit_path(&self) -> Option<&str> {
        self.config.as_deref()
    }

    fn layer_over(self, file: Self) -> Self {
        self.merge(file)
    }

    fn validate(&self) -> Result<(), Error> {
        self.fetch_interval()?;
        for (name, url) in [("base_url", self.base_url()), ("feed_url", self.feed_url())] {
            Url::parse(&url).map_err(|e| anyhow!("invalid {} '{}': {}", name, url, e))?;
        }
        Ok(())
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<(Cli, ConfigSource), Error> {
    // env vars are handled by clap
    resolve_config(Cli::parse())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

pub struct XmlFetcher {
    logger: Logger,
    user_agent: String,
}

impl XmlFetcher {
    pub fn new(logger: Logger, user_agent: String) -> XmlFetcher {
        Self { logger, user_agent }
    }

    pub async fn fetch_xml(&self, url: &str) -> Result<String, Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(Client::builder().user_agent(&self.user_agent).build()?)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        debug!(self.logger, "requesting: {}", url);
        let response = client
            .get(url)
            .timeout(Duration::from_secs(20))
            .send()
            .await
            .map_err(|e| anyhow!("error sending request: {}", e))?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "error response from feed, status code: {}",
                response.status()
            ));
        }
        match response.text().await {
            Ok(xml_content) => Ok(xml_content),
            Err(e) => Err(anyhow!("error parsing body of request: {}", e)),
        }
    }
}
