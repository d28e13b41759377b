pub mod fee_routes;

pub use fee_routes::*;
