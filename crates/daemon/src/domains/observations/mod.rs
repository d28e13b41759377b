pub mod download_observations;
pub mod feed;

pub use download_observations::*;
pub use feed::*;
