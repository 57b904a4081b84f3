//! Gateway domain: configuration and error types.

pub mod config;
pub mod error;

pub use config::{
    AuthConfig, ConfigError, GatewayConfig, HttpConfig, LimitsConfig, TimeoutConfig, UserConfig,
};
pub use error::{messages, ApiError, GatewayError};
