use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use delivery_fee_core::{
    fee_breakdown, latest, resolve, City, FeeError, FeeQuery, Vehicle, WeatherObservation,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::ObservationStore;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
    #[error("Failed to access observation store: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub reason: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Fee(FeeError::InvalidCity(_))
            | Error::Fee(FeeError::InvalidVehicle(_))
            | Error::InvalidObservation(_) => StatusCode::BAD_REQUEST,
            Error::Fee(FeeError::Forbidden(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Fee(FeeError::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("error handling request: {:?}", self);
        } else {
            debug!("rejected request: {}", self);
        }
        let body = ErrorResponse {
            reason: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Optional inclusive time bounds for an observation history query
#[derive(Clone, Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

impl HistoryParams {
    fn contains(&self, observed_at: OffsetDateTime) -> bool {
        self.start.map_or(true, |start| observed_at >= start)
            && self.end.map_or(true, |end| observed_at <= end)
    }
}

/// A computed fee with every component and the observation it was based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeeDetails {
    pub city: City,
    pub vehicle: Vehicle,
    pub station: String,
    pub rbf: f64,
    pub atef: f64,
    pub wsef: f64,
    pub wpef: f64,
    pub total: f64,
    pub observation: WeatherObservation,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddedObservations {
    pub added: u64,
}

/// Glue between the observation store and the fee rules. Holds no per request
/// state, every call works on freshly loaded observations.
pub struct FeeService {
    store: Arc<dyn ObservationStore>,
}

impl FeeService {
    pub fn new(store: Arc<dyn ObservationStore>) -> Self {
        Self { store }
    }

    pub async fn latest_observation(&self, alias: &str) -> Result<WeatherObservation, Error> {
        let station = resolve(alias)?;
        let observations = self.store.observations_for_station(station).await?;
        Ok(latest(station, observations)?)
    }

    /// Observations for the station behind `alias`, oldest first
    pub async fn observation_history(
        &self,
        alias: &str,
        params: &HistoryParams,
    ) -> Result<Vec<WeatherObservation>, Error> {
        let station = resolve(alias)?;
        let mut observations: Vec<WeatherObservation> = self
            .store
            .observations_for_station(station)
            .await?
            .into_iter()
            .filter(|observation| params.contains(observation.observed_at))
            .collect();
        // stable, so equal timestamps stay in insertion order
        observations.sort_by_key(|observation| observation.observed_at);
        Ok(observations)
    }

    pub async fn calculate_fee(&self, city: &str, vehicle: &str) -> Result<FeeDetails, Error> {
        let query = FeeQuery::parse(city, vehicle)?;
        let station = query.city.station_name();

        let observations = self.store.observations_for_station(station).await?;
        let observation = latest(station, observations)?;
        let breakdown = fee_breakdown(query, &observation)?;

        Ok(FeeDetails {
            city: query.city,
            vehicle: query.vehicle,
            station: station.to_owned(),
            rbf: breakdown.rbf,
            atef: breakdown.atef,
            wsef: breakdown.wsef,
            wpef: breakdown.wpef,
            total: breakdown.total(),
            observation,
        })
    }

    pub async fn add_observations(
        &self,
        observations: Vec<WeatherObservation>,
    ) -> Result<AddedObservations, Error> {
        if let Some(position) = observations
            .iter()
            .position(|observation| observation.station.trim().is_empty())
        {
            return Err(Error::InvalidObservation(format!(
                "observation {} has an empty station name",
                position
            )));
        }
        if observations.is_empty() {
            return Ok(AddedObservations { added: 0 });
        }

        let added = self.store.add_observations(observations).await?;
        info!("stored {} new weather observations", added);
        Ok(AddedObservations { added })
    }
}
