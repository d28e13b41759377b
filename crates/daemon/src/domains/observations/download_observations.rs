use anyhow::{anyhow, Error};
use delivery_fee_core::{is_tracked_station, WeatherObservation};
use slog::{info, warn, Logger};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::{ObservationsFeed, XmlFetcher};

pub struct ObservationService {
    pub logger: Logger,
    pub fetcher: Arc<XmlFetcher>,
    pub feed_url: String,
}

impl ObservationService {
    pub fn new(logger: Logger, fetcher: Arc<XmlFetcher>, feed_url: String) -> Self {
        ObservationService {
            logger,
            fetcher,
            feed_url,
        }
    }

    /// Fetches the feed and returns one observation per tracked station that
    /// had usable readings this cycle.
    pub async fn get_observations(&self) -> Result<Vec<WeatherObservation>, Error> {
        info!(self.logger, "fetching observations from {}", self.feed_url);
        let raw_observations = self.fetcher.fetch_xml(&self.feed_url).await?;
        self.parse_observations(&raw_observations, OffsetDateTime::now_utc())
    }

    /// `fetched_at` stands in for the observation time when the feed has no timestamp
    pub fn parse_observations(
        &self,
        raw_xml: &str,
        fetched_at: OffsetDateTime,
    ) -> Result<Vec<WeatherObservation>, Error> {
        let converted_xml: ObservationsFeed = serde_xml_rs::from_str(raw_xml)
            .map_err(|e| anyhow!("error parsing observations xml: {}", e))?;
        let observed_at = converted_xml.published_at().unwrap_or(fetched_at);

        let mut observations = vec![];
        for reading in converted_xml.stations.iter() {
            let Some(name) = reading.station_name() else {
                continue;
            };
            if !is_tracked_station(name) {
                continue;
            }
            match reading.to_observation(observed_at) {
                Ok(observation) => observations.push(observation),
                // skip the station for this cycle, the next fetch may be complete
                Err(e) => warn!(self.logger, "skipping station {}: {}", name, e),
            }
        }

        info!(
            self.logger,
            "parsed {} observations of tracked stations",
            observations.len()
        );
        Ok(observations)
    }
}
