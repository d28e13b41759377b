use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::FeeError;

/// A single reading from a weather station. Observations are append only,
/// nothing updates one after it has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherObservation {
    /// Canonical station name, e.g. "Tallinn-Harku"
    pub station: String,
    /// WMO code of the station, when the feed provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wmo_code: Option<String>,
    /// Air temperature in degrees Celsius
    pub air_temperature: f64,
    /// Wind speed in meters per second
    pub wind_speed: f64,
    /// Free text weather phenomenon, empty when the sky is clear
    #[serde(default)]
    pub phenomenon: String,
    #[serde(with = "time::serde::rfc3339")]
    pub observed_at: OffsetDateTime,
}

/// Pick the most recent observation for `station`.
///
/// Observations for other stations are ignored. When several observations share
/// the newest timestamp, the one that comes last in `observations` wins, so
/// callers should pass observations in insertion order.
pub fn latest<I>(station: &str, observations: I) -> Result<WeatherObservation, FeeError>
where
    I: IntoIterator<Item = WeatherObservation>,
{
    observations
        .into_iter()
        .filter(|observation| observation.station == station)
        // max_by_key keeps the last of several equal maxima
        .max_by_key(|observation| observation.observed_at)
        .ok_or_else(|| FeeError::NotFound(station.to_owned()))
}
