use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{AppState, Error, ErrorResponse, FeeDetails};

#[utoipa::path(
    get,
    path = "/fee/{city}/{vehicle}",
    params(
        ("city" = String, Path, description = "City of delivery: tallinn, tartu or pärnu (case-insensitive)"),
        ("vehicle" = String, Path, description = "Vehicle of delivery: car, scooter or bike (case-insensitive)"),
    ),
    responses(
        (status = OK, description = "Total delivery fee in euros", body = f64),
        (status = BAD_REQUEST, description = "Unknown city or vehicle", body = ErrorResponse),
        (status = NOT_FOUND, description = "No weather observation stored for the city yet", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Usage of the selected vehicle type is forbidden", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read weather observations", body = ErrorResponse)
    ))]
pub async fn get_fee(
    State(state): State<Arc<AppState>>,
    Path((city, vehicle)): Path<(String, String)>,
) -> Result<Json<f64>, Error> {
    let details = state.fee_service.calculate_fee(&city, &vehicle).await?;
    Ok(Json(details.total))
}

#[utoipa::path(
    get,
    path = "/fee/{city}/{vehicle}/breakdown",
    params(
        ("city" = String, Path, description = "City of delivery: tallinn, tartu or pärnu (case-insensitive)"),
        ("vehicle" = String, Path, description = "Vehicle of delivery: car, scooter or bike (case-insensitive)"),
    ),
    responses(
        (status = OK, description = "Every component of the delivery fee", body = FeeDetails),
        (status = BAD_REQUEST, description = "Unknown city or vehicle", body = ErrorResponse),
        (status = NOT_FOUND, description = "No weather observation stored for the city yet", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Usage of the selected vehicle type is forbidden", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read weather observations", body = ErrorResponse)
    ))]
pub async fn get_fee_breakdown(
    State(state): State<Arc<AppState>>,
    Path((city, vehicle)): Path<(String, String)>,
) -> Result<Json<FeeDetails>, Error> {
    let details = state.fee_service.calculate_fee(&city, &vehicle).await?;
    Ok(Json(details))
}
