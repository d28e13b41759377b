use crate::helpers::{observation, spawn_app, MockDatabase};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use delivery_fee_core::WeatherObservation;
use hyper::{header, Method};
use serde_json::from_slice;
use server::AddedObservations;
use std::sync::Arc;
use time::macros::datetime;
use tower::ServiceExt;

fn tallinn_observations() -> Vec<WeatherObservation> {
    vec![
        observation("Tallinn-Harku", 1.0, 4.0, "Overcast", datetime!(2024-03-01 12:15 UTC)),
        observation("Tallinn-Harku", 0.5, 5.0, "Light rain", datetime!(2024-03-01 10:15 UTC)),
        observation("Tallinn-Harku", 0.0, 6.0, "Mist", datetime!(2024-03-01 11:15 UTC)),
    ]
}

#[tokio::test]
async fn latest_observation_for_station_alias() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .withf(|station: &str| station == "Tallinn-Harku")
        .times(1)
        .returning(|_| Ok(tallinn_observations()));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/weather/tallinn")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let latest: WeatherObservation = from_slice(&body).unwrap();
    assert_eq!(latest.phenomenon, "Overcast");
    assert_eq!(latest.observed_at, datetime!(2024-03-01 12:15 UTC));
}

#[tokio::test]
async fn latest_observation_not_found_without_data() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| Ok(vec![]));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/weather/tartu")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn latest_observation_rejects_unknown_alias() {
    let mut weather_data = MockDatabase::new();
    weather_data.expect_observations_for_station().times(0);

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/weather/narnia")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_is_sorted_and_bounded() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| Ok(tallinn_observations()));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/weather/tallinn/history?start=2024-03-01T11:00:00Z&end=2024-03-01T12:15:00Z")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let history: Vec<WeatherObservation> = from_slice(&body).unwrap();
    let phenomena: Vec<&str> = history.iter().map(|o| o.phenomenon.as_str()).collect();
    assert_eq!(phenomena, vec!["Mist", "Overcast"]);
}

#[tokio::test]
async fn history_without_bounds_returns_everything() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| Ok(tallinn_observations()));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/weather/tallinn/history")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let history: Vec<WeatherObservation> = from_slice(&body).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].phenomenon, "Light rain");
}

#[tokio::test]
async fn posted_observations_are_stored() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_add_observations()
        .withf(|observations: &Vec<WeatherObservation>| {
            observations.len() == 2 && observations[0].station == "Pärnu"
        })
        .times(1)
        .returning(|observations| Ok(observations.len() as u64));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let payload = serde_json::json!([
        {
            "station": "Pärnu",
            "wmo_code": "41803",
            "air_temperature": 2.9,
            "wind_speed": 4.4,
            "phenomenon": "Clear",
            "observed_at": "2024-03-01T11:15:00Z"
        },
        {
            "station": "Tallinn-Harku",
            "air_temperature": -1.4,
            "wind_speed": 6.1,
            "observed_at": "2024-03-01T11:15:00Z"
        }
    ]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/weather")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let added: AddedObservations = from_slice(&body).unwrap();
    assert_eq!(added.added, 2);
}

#[tokio::test]
async fn observation_without_station_is_rejected() {
    let mut weather_data = MockDatabase::new();
    weather_data.expect_add_observations().times(0);

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let payload = serde_json::json!([
        {
            "station": " ",
            "air_temperature": 2.9,
            "wind_speed": 4.4,
            "observed_at": "2024-03-01T11:15:00Z"
        }
    ]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/weather")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
