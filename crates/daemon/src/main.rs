use daemon::{get_config_info, send_observations, setup_logger, Cli, ObservationService, XmlFetcher};
use slog::{debug, error, info, Logger};
use std::{sync::Arc, time::Duration};
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let (cli, config_source) = get_config_info()?;
    let logger = setup_logger(&cli);
    let fetch_interval = cli.fetch_interval()?;

    info!(logger, "Delivery fee daemon starting...");
    info!(logger, "  Server URL: {}", cli.base_url());
    info!(logger, "  Feed URL: {}", cli.feed_url());
    info!(logger, "  Fetch interval: {} seconds", fetch_interval.as_secs());
    info!(logger, "  Config: {}", config_source);

    process_weather_data_hourly(cli, logger, fetch_interval).await;
    Ok(())
}

async fn process_weather_data_hourly(cli: Cli, logger: Logger, fetch_interval: Duration) {
    let sleep_between_checks = fetch_interval.as_secs();

    let fetcher = Arc::new(XmlFetcher::new(logger.clone(), cli.user_agent()));
    let observation_service = ObservationService::new(logger.clone(), fetcher, cli.feed_url());

    let mut check_channel_interval = interval(fetch_interval);
    loop {
        tokio::select! {
            _ = check_channel_interval.tick() => {
                match process_data(&cli, &logger, &observation_service).await {
                    Ok(_) => info!(logger, "Finished processing data, waiting {} seconds for next run", sleep_between_checks),
                    Err(err) => error!(&logger, "Error processing data: {}", err)
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!(logger, "Shutdown signal received, stopping daemon");
                break;
            }
        }
    }
}

async fn process_data(
    cli: &Cli,
    logger: &Logger,
    observation_service: &ObservationService,
) -> Result<(), anyhow::Error> {
    let observations = observation_service.get_observations().await?;
    debug!(logger, "observations count: {}", observations.len());

    let added = send_observations(&cli.base_url(), logger, &observations).await?;
    debug!(logger, "uploaded observations: {}", added);
    Ok(())
}
