use crate::helpers::{observation, spawn_app, MockDatabase};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use hyper::Method;
use serde_json::{from_slice, Value};
use server::{ErrorResponse, FeeDetails};
use std::sync::Arc;
use time::macros::datetime;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn fee_uses_latest_observation_for_the_city() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .withf(|station: &str| station == "Pärnu")
        .times(1)
        .returning(|_| {
            Ok(vec![
                observation("Pärnu", 8.0, 9.0, "Light rain", datetime!(2024-03-01 11:15 UTC)),
                // older snow reading must not be used
                observation("Pärnu", -12.0, 9.0, "Heavy snow", datetime!(2024-03-01 10:15 UTC)),
            ])
        });

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/p%C3%A4rnu/scooter"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let fee: f64 = from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(fee, 3.0);
}

#[tokio::test]
async fn fee_input_is_case_insensitive() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .withf(|station: &str| station == "Tallinn-Harku")
        .times(1)
        .returning(|_| {
            Ok(vec![observation(
                "Tallinn-Harku",
                5.0,
                3.0,
                "",
                datetime!(2024-03-01 11:15 UTC),
            )])
        });

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/Tallinn/CAR"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let fee: f64 = from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(fee, 4.0);
}

#[tokio::test]
async fn breakdown_lists_every_component() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| {
            Ok(vec![observation(
                "Tartu-Tõravere",
                -2.1,
                14.7,
                "Light snow shower",
                datetime!(2024-03-01 11:15 UTC),
            )])
        });

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/tartu/bike/breakdown"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let details: FeeDetails = from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(details.station, "Tartu-Tõravere");
    assert_eq!(details.rbf, 2.5);
    assert_eq!(details.atef, 0.5);
    assert_eq!(details.wsef, 0.5);
    assert_eq!(details.wpef, 1.0);
    assert_eq!(details.total, 4.5);
    assert_eq!(details.observation.phenomenon, "Light snow shower");
}

#[tokio::test]
async fn unknown_vehicle_is_a_bad_request() {
    let mut weather_data = MockDatabase::new();
    weather_data.expect_observations_for_station().times(0);

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/tallinn/skateboard"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = from_slice(&body_bytes(response).await).unwrap();
    assert!(error.reason.contains("skateboard"));
}

#[tokio::test]
async fn unknown_city_is_a_bad_request() {
    let mut weather_data = MockDatabase::new();
    weather_data.expect_observations_for_station().times(0);

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/narnia/car"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = from_slice(&body_bytes(response).await).unwrap();
    assert!(error.reason.contains("narnia"));
}

#[tokio::test]
async fn strong_wind_forbids_bike() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| {
            Ok(vec![observation(
                "Tallinn-Harku",
                5.0,
                25.0,
                "Clear",
                datetime!(2024-03-01 11:15 UTC),
            )])
        });

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/tallinn/bike"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = from_slice(&body_bytes(response).await).unwrap();
    assert!(body["reason"]
        .as_str()
        .unwrap()
        .contains("wind speed forbidden"));
}

#[tokio::test]
async fn glaze_forbids_scooter() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| {
            Ok(vec![observation(
                "Tartu-Tõravere",
                -1.0,
                3.0,
                "Glaze",
                datetime!(2024-03-01 11:15 UTC),
            )])
        });

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/tartu/scooter"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = from_slice(&body_bytes(response).await).unwrap();
    assert!(error.reason.contains("phenomenon forbidden"));
}

#[tokio::test]
async fn missing_observations_are_not_a_zero_fee() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| Ok(vec![]));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/tartu/car"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failure_is_an_internal_error() {
    let mut weather_data = MockDatabase::new();
    weather_data
        .expect_observations_for_station()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("database is locked")));

    let test_app = spawn_app(Arc::new(weather_data)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(get("/fee/tartu/car"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
