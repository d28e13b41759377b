//! Delivery Fee Core Library
//!
//! Business rules shared by the server and the ingestion daemon:
//! - Station resolution (city alias to weather station)
//! - Latest observation selection
//! - The delivery fee rule engine
//!
//! Plus configuration loading (XDG-compliant) and file system utilities.

mod config;
mod error;
pub mod fee;
pub mod fs;
mod observation;
pub mod station;
mod vehicle;

pub use config::{locate_config, read_config, resolve_config, ConfigSource, ServiceConfig};
pub use error::{FeeError, ForbiddenCondition};
pub use fee::{compute_fee, fee_breakdown, FeeBreakdown, FeeQuery};
pub use fs::create_dir_all;
pub use observation::{latest, WeatherObservation};
pub use station::{is_tracked_station, resolve, tracked_stations, City};
pub use vehicle::Vehicle;

/// Application name used for XDG paths
pub const APP_NAME: &str = "delivery-fee";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 9900;

/// Default daemon fetch interval (1 hour)
pub const DEFAULT_FETCH_INTERVAL: u64 = 3600;
