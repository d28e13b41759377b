//! Delivery fee rules.
//!
//! A fee is the regional base fee (RBF) for the city and vehicle plus three
//! weather surcharges taken from a single observation:
//! - ATEF, air temperature extra fee (scooter and bike)
//! - WSEF, wind speed extra fee (bike only)
//! - WPEF, weather phenomenon extra fee (scooter and bike)
//!
//! Some weather makes a vehicle unusable altogether, in which case no fee is
//! produced at all.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{City, FeeError, ForbiddenCondition, Vehicle, WeatherObservation};

/// Validated city and vehicle pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuery {
    pub city: City,
    pub vehicle: Vehicle,
}

impl FeeQuery {
    /// Parse raw user input. The vehicle is checked before the city.
    pub fn parse(city: &str, vehicle: &str) -> Result<Self, FeeError> {
        let vehicle = vehicle.parse::<Vehicle>()?;
        let city = city.parse::<City>()?;
        Ok(FeeQuery { city, vehicle })
    }
}

/// Named components of a computed fee, in euros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct FeeBreakdown {
    pub rbf: f64,
    pub atef: f64,
    pub wsef: f64,
    pub wpef: f64,
}

impl FeeBreakdown {
    pub fn total(&self) -> f64 {
        self.rbf + self.atef + self.wsef + self.wpef
    }
}

/// Compute the fee from raw city and vehicle input.
pub fn compute_fee(
    city: &str,
    vehicle: &str,
    observation: &WeatherObservation,
) -> Result<f64, FeeError> {
    let query = FeeQuery::parse(city, vehicle)?;
    fee_breakdown(query, observation).map(|breakdown| breakdown.total())
}

/// Compute every fee component for an already validated query.
///
/// Both the wind and the phenomenon surcharges are evaluated before either
/// result is inspected. When both forbid the vehicle the wind speed violation
/// is the one reported.
pub fn fee_breakdown(
    query: FeeQuery,
    observation: &WeatherObservation,
) -> Result<FeeBreakdown, FeeError> {
    let mut breakdown = FeeBreakdown {
        rbf: regional_base_fee(query.city, query.vehicle),
        ..FeeBreakdown::default()
    };
    if !query.vehicle.is_weather_exposed() {
        return Ok(breakdown);
    }

    let wind = match query.vehicle {
        Vehicle::Bike => wind_speed_fee(observation.wind_speed),
        _ => Ok(0.0),
    };
    let phenomenon = phenomenon_fee(&observation.phenomenon);

    breakdown.atef = air_temperature_fee(observation.air_temperature);
    breakdown.wsef = wind?;
    breakdown.wpef = phenomenon?;
    Ok(breakdown)
}

pub fn regional_base_fee(city: City, vehicle: Vehicle) -> f64 {
    match (city, vehicle) {
        (City::Tallinn, Vehicle::Car) => 4.0,
        (City::Tallinn, Vehicle::Scooter) => 3.5,
        (City::Tallinn, Vehicle::Bike) => 3.0,
        (City::Tartu, Vehicle::Car) => 3.5,
        (City::Tartu, Vehicle::Scooter) => 3.0,
        (City::Tartu, Vehicle::Bike) => 2.5,
        (City::Parnu, Vehicle::Car) => 3.0,
        (City::Parnu, Vehicle::Scooter) => 2.5,
        (City::Parnu, Vehicle::Bike) => 2.0,
    }
}

pub fn air_temperature_fee(air_temperature: f64) -> f64 {
    if air_temperature < -10.0 {
        1.0
    } else if air_temperature <= 0.0 {
        0.5
    } else {
        0.0
    }
}

pub fn wind_speed_fee(wind_speed: f64) -> Result<f64, FeeError> {
    if wind_speed > 20.0 {
        Err(FeeError::Forbidden(ForbiddenCondition::WindSpeed))
    } else if wind_speed >= 10.0 {
        Ok(0.5)
    } else {
        Ok(0.0)
    }
}

pub fn phenomenon_fee(phenomenon: &str) -> Result<f64, FeeError> {
    let phenomenon = phenomenon.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|word| phenomenon.contains(word));

    if contains_any(&["snow", "sleet"]) {
        Ok(1.0)
    } else if contains_any(&["rain"]) {
        Ok(0.5)
    } else if contains_any(&["glaze", "hail", "thunder"]) {
        Err(FeeError::Forbidden(ForbiddenCondition::Phenomenon))
    } else {
        Ok(0.0)
    }
}
