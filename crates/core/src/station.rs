//! Mapping between the cities we deliver in and the weather stations that
//! observe them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::FeeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Tallinn,
    Tartu,
    #[serde(rename = "pärnu")]
    Parnu,
}

impl City {
    pub const ALL: [City; 3] = [City::Tallinn, City::Tartu, City::Parnu];

    pub fn alias(&self) -> &'static str {
        match self {
            City::Tallinn => "tallinn",
            City::Tartu => "tartu",
            City::Parnu => "pärnu",
        }
    }

    /// Canonical name of the station as it appears in the weather feed and in storage
    pub fn station_name(&self) -> &'static str {
        match self {
            City::Tallinn => "Tallinn-Harku",
            City::Tartu => "Tartu-Tõravere",
            City::Parnu => "Pärnu",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alias())
    }
}

impl FromStr for City {
    type Err = FeeError;

    fn from_str(alias: &str) -> Result<Self, Self::Err> {
        match alias.to_lowercase().as_str() {
            "tallinn" => Ok(City::Tallinn),
            "tartu" => Ok(City::Tartu),
            "pärnu" => Ok(City::Parnu),
            _ => Err(FeeError::InvalidCity(alias.to_owned())),
        }
    }
}

/// Resolve a user facing city alias to the station name used in storage.
pub fn resolve(alias: &str) -> Result<&'static str, FeeError> {
    alias.parse::<City>().map(|city| city.station_name())
}

/// Names of every station the services track.
pub fn tracked_stations() -> impl Iterator<Item = &'static str> {
    City::ALL.into_iter().map(|city| city.station_name())
}

pub fn is_tracked_station(name: &str) -> bool {
    tracked_stations().any(|station| station == name)
}
