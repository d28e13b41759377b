mod db;
mod fee_service;
mod routes;
mod startup;
mod utils;

pub use db::*;
pub use fee_service::*;
pub use routes::*;
pub use startup::*;
pub use utils::*;
