pub mod fee;
pub mod weather;

pub use fee::*;
pub use weather::*;
