pub mod config;
pub mod error;
pub mod gateway;
pub mod infra;
pub mod routes;

pub use config::Config;
pub use error::GatewayError;
pub use gateway::{Gateway, NormalizedResponse, RequestDescription};
