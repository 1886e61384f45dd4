pub mod analysis;
pub mod configuration;
pub mod db;
pub mod decision;
pub mod error;
pub mod model;
pub mod state;
pub mod store;
pub mod thresholds;

pub use error::Error;
