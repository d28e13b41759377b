use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::FeeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Vehicle {
    Car,
    Scooter,
    Bike,
}

impl Vehicle {
    pub const ALL: [Vehicle; 3] = [Vehicle::Car, Vehicle::Scooter, Vehicle::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vehicle::Car => "car",
            Vehicle::Scooter => "scooter",
            Vehicle::Bike => "bike",
        }
    }

    /// Scooters and bikes pay the temperature and phenomenon surcharges
    pub fn is_weather_exposed(&self) -> bool {
        matches!(self, Vehicle::Scooter | Vehicle::Bike)
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Vehicle {
    type Err = FeeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "car" => Ok(Vehicle::Car),
            "scooter" => Ok(Vehicle::Scooter),
            "bike" => Ok(Vehicle::Bike),
            _ => Err(FeeError::InvalidVehicle(value.to_owned())),
        }
    }
}
