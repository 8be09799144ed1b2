pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};

/// Label used for pool metrics and startup logs
pub const SERVICE_NAME: &str = "wall-service";
