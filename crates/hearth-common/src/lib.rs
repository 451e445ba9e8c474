//! # hearth-common
//!
//! Configuration, shared errors, token and password helpers, and tracing
//! setup used by every binary in the workspace.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

pub use auth::{
    generate_refresh_token, hash_password, validate_password_strength, verify_password,
    AccessToken, Claims, JwtService,
};
pub use config::{
    AppConfig, AppSettings, ChatConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    FeedConfig, GatewayConfig, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig,
    SnowflakeConfig,
};
pub use error::{domain_status, AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
