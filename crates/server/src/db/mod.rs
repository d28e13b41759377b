mod sqlite;

use async_trait::async_trait;
use delivery_fee_core::WeatherObservation;

pub use sqlite::*;

/// Append only storage of weather observations.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Every stored observation for `station`, in the order they were added.
    /// An unknown station yields an empty list.
    async fn observations_for_station(
        &self,
        station: &str,
    ) -> anyhow::Result<Vec<WeatherObservation>>;

    /// Append a batch of observations atomically, returning how many were stored.
    async fn add_observations(&self, observations: Vec<WeatherObservation>)
        -> anyhow::Result<u64>;
}
