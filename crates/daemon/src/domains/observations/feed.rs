use anyhow::anyhow;
use delivery_fee_core::WeatherObservation;
use serde::Deserialize;
use time::OffsetDateTime;

// https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php
// <observations timestamp="1709288100">
//   <station>
//     <name>Tallinn-Harku</name>
//     <wmocode>26038</wmocode>
//     <phenomenon>Light snow shower</phenomenon>
//     <airtemperature>-2.1</airtemperature>
//     <windspeed>4.7</windspeed>
//     ...
//   </station>
// </observations>

#[derive(Default, Debug, Clone, Deserialize)]
pub struct ObservationsFeed {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "station", default)]
    pub stations: Vec<StationReading>,
}

impl ObservationsFeed {
    /// Time the agency published the readings, if the feed carries a usable one
    pub fn published_at(&self) -> Option<OffsetDateTime> {
        self.timestamp
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
    }
}

#[derive(Default, Debug, Clone, Deserialize)]
pub struct StationReading {
    pub name: Option<String>,
    pub wmocode: Option<String>,
    pub phenomenon: Option<String>,
    pub airtemperature: Option<String>,
    pub windspeed: Option<String>,
}

impl StationReading {
    pub fn station_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn to_observation(
        &self,
        observed_at: OffsetDateTime,
    ) -> Result<WeatherObservation, anyhow::Error> {
        let station = self
            .station_name()
            .ok_or_else(|| anyhow!("missing station name"))?;

        Ok(WeatherObservation {
            station: station.to_owned(),
            wmo_code: self
                .wmocode
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_owned),
            air_temperature: parse_number("airtemperature", self.airtemperature.as_deref())?,
            wind_speed: parse_number("windspeed", self.windspeed.as_deref())?,
            phenomenon: self
                .phenomenon
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_owned(),
            observed_at,
        })
    }
}

fn parse_number(field: &str, value: Option<&str>) -> Result<f64, anyhow::Error> {
    let raw = value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| anyhow!("missing {}", field))?;
    raw.parse::<f64>()
        .map_err(|e| anyhow!("error parsing {} '{}': {}", field, raw, e))
}
