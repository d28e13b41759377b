use std::fmt;

/// Weather condition that rules out the requested vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenCondition {
    WindSpeed,
    Phenomenon,
}

impl fmt::Display for ForbiddenCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenCondition::WindSpeed => write!(f, "wind speed forbidden"),
            ForbiddenCondition::Phenomenon => write!(f, "phenomenon forbidden"),
        }
    }
}

/// Every way a fee query can be rejected. All variants are terminal for the
/// request that produced them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeeError {
    #[error("Invalid city: {0}")]
    InvalidCity(String),
    #[error("Invalid vehicle type: {0}")]
    InvalidVehicle(String),
    #[error("Usage of selected vehicle type is forbidden: {0}")]
    Forbidden(ForbiddenCondition),
    #[error("No weather observation found for station: {0}")]
    NotFound(String),
}
