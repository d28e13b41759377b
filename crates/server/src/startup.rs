use crate::{
    add_observations, get_fee, get_fee_breakdown, latest_observation, observation_history, routes,
    AddedObservations, Database, ErrorResponse, FeeDetails, FeeService, ObservationStore,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use delivery_fee_core::{City, Vehicle, WeatherObservation};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub fee_service: Arc<FeeService>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObservationStore>) -> Self {
        Self {
            fee_service: Arc::new(FeeService::new(store)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::fee::fee_routes::get_fee,
        routes::fee::fee_routes::get_fee_breakdown,
        routes::weather::weather_routes::latest_observation,
        routes::weather::weather_routes::observation_history,
        routes::weather::weather_routes::add_observations,
    ),
    components(
        schemas(
            WeatherObservation,
            FeeDetails,
            AddedObservations,
            ErrorResponse,
            City,
            Vehicle
        )
    ),
    tags(
        (name = "delivery fee api", description = "a RESTful api computing food delivery fees from the latest weather observations")
    )
)]
struct ApiDoc;

pub async fn build_app_state(data_dir: String) -> Result<AppState, anyhow::Error> {
    let db = Database::new(&data_dir)
        .await
        .map_err(|e| anyhow!("error setting up SQLite database: {}", e))?;

    Ok(AppState::new(Arc::new(db)))
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/fee/{city}/{vehicle}", get(get_fee))
        .route("/fee/{city}/{vehicle}/breakdown", get(get_fee_breakdown))
        .route("/weather", post(add_observations))
        .route("/weather/{station}", get(latest_observation))
        .route("/weather/{station}/history", get(observation_history))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
