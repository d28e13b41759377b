use anyhow::{anyhow, Error};
use delivery_fee_core::WeatherObservation;
use reqwest::Client;
use serde::Deserialize;
use slog::{error, info, Logger};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct AddedResponse {
    added: u64,
}

fn weather_endpoint(base_url: &str) -> String {
    format!("{}/weather", base_url.trim_end_matches('/'))
}

/// Posts one fetch cycle to the server, returns how many rows it stored
pub async fn send_observations(
    base_url: &str,
    logger: &Logger,
    observations: &[WeatherObservation],
) -> Result<u64, Error> {
    if observations.is_empty() {
        info!(logger, "no observations to upload");
        return Ok(0);
    }

    let endpoint_url = weather_endpoint(base_url);
    info!(
        logger,
        "sending {} observations to endpoint: {}",
        observations.len(),
        endpoint_url
    );

    let response = Client::new()
        .post(&endpoint_url)
        .timeout(Duration::from_secs(20))
        .json(observations)
        .send()
        .await
        .map_err(|e| anyhow!("error sending observations to api: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(
            logger,
            "failed to upload observations. status code: {:?} body: {}", status, body
        );
        return Err(anyhow!("upload rejected with status code: {}", status));
    }

    let added: AddedResponse = response
        .json()
        .await
        .map_err(|e| anyhow!("error parsing upload response: {}", e))?;
    info!(logger, "server stored {} observations", added.added);
    Ok(added.added)
}
