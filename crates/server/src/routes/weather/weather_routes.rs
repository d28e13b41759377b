use axum::{
    extract::{Path, Query, State},
    Json,
};
use delivery_fee_core::WeatherObservation;
use std::sync::Arc;

use crate::{AddedObservations, AppState, Error, ErrorResponse, HistoryParams};

#[utoipa::path(
    get,
    path = "/weather/{station}",
    params(
        ("station" = String, Path, description = "City alias of the station: tallinn, tartu or pärnu"),
    ),
    responses(
        (status = OK, description = "Latest observation for the station", body = WeatherObservation),
        (status = BAD_REQUEST, description = "Unknown city alias", body = ErrorResponse),
        (status = NOT_FOUND, description = "No observation stored for the station yet", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read weather observations", body = ErrorResponse)
    ))]
pub async fn latest_observation(
    State(state): State<Arc<AppState>>,
    Path(station): Path<String>,
) -> Result<Json<WeatherObservation>, Error> {
    let observation = state.fee_service.latest_observation(&station).await?;
    Ok(Json(observation))
}

#[utoipa::path(
    get,
    path = "/weather/{station}/history",
    params(
        ("station" = String, Path, description = "City alias of the station: tallinn, tartu or pärnu"),
        HistoryParams
    ),
    responses(
        (status = OK, description = "Observations for the station, oldest first", body = Vec<WeatherObservation>),
        (status = BAD_REQUEST, description = "Unknown city alias", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read weather observations", body = ErrorResponse)
    ))]
pub async fn observation_history(
    State(state): State<Arc<AppState>>,
    Path(station): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<WeatherObservation>>, Error> {
    let observations = state
        .fee_service
        .observation_history(&station, &params)
        .await?;
    Ok(Json(observations))
}

#[utoipa::path(
    post,
    path = "/weather",
    request_body = Vec<WeatherObservation>,
    responses(
        (status = OK, description = "Observations were stored", body = AddedObservations),
        (status = BAD_REQUEST, description = "An observation is missing its station", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to store observations", body = ErrorResponse)
    ))]
pub async fn add_observations(
    State(state): State<Arc<AppState>>,
    Json(observations): Json<Vec<WeatherObservation>>,
) -> Result<Json<AddedObservations>, Error> {
    let added = state.fee_service.add_observations(observations).await?;
    Ok(Json(added))
}
