//! Application configuration structs
//!
//! Values come from environment variables (a `.env` file is honored).
//! `from_lookup` takes the variable source as a closure so tests can supply
//! their own map.

use serde::Deserialize;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub chat: ChatConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Push gateway listener and heartbeat settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    /// Milliseconds between client heartbeats announced in HELLO.
    pub heartbeat_interval_ms: u64,
    /// Topics a single connection may hold at once.
    pub max_subscriptions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Seconds
    pub access_token_expiry: i64,
    /// Seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    pub node_id: u16,
}

/// Upstream language model used by the chat proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Absent key is not a startup error; requests fail with a config error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub page_size: i64,
    pub max_page_size: i64,
    /// Upper bound on ids returned by mood matching.
    pub mood_match_limit: i64,
}

const DEFAULT_APP_NAME: &str = "hearth";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let env = match vars.get("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: vars.string_or("APP_NAME", DEFAULT_APP_NAME),
                env,
            },
            api: ServerConfig {
                host: vars.string_or("API_HOST", DEFAULT_HOST),
                port: vars.parse_or("API_PORT", 8080)?,
            },
            gateway: GatewayConfig {
                server: ServerConfig {
                    host: vars.string_or("GATEWAY_HOST", DEFAULT_HOST),
                    port: vars.parse_or("GATEWAY_PORT", 8081)?,
                },
                heartbeat_interval_ms: vars.parse_or("GATEWAY_HEARTBEAT_INTERVAL_MS", 41_250)?,
                max_subscriptions: vars.parse_or("GATEWAY_MAX_SUBSCRIPTIONS", 256)?,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
                min_connections: vars.parse_or("DATABASE_MIN_CONNECTIONS", 2)?,
            },
            redis: RedisConfig {
                url: vars.string_or("REDIS_URL", "redis://127.0.0.1:6379"),
                max_connections: vars.parse_or("REDIS_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret: vars.required("JWT_SECRET")?,
                access_token_expiry: vars.parse_or("JWT_ACCESS_TOKEN_EXPIRY", 900)?,
                refresh_token_expiry: vars.parse_or("JWT_REFRESH_TOKEN_EXPIRY", 604_800)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars.parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", 10)?,
                burst: vars.parse_or("RATE_LIMIT_BURST", 50)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                node_id: vars.parse_or("SNOWFLAKE_NODE_ID", 0)?,
            },
            chat: ChatConfig {
                api_key: vars.get("CHAT_API_KEY").filter(|k| !k.trim().is_empty()),
                base_url: vars
                    .string_or("CHAT_BASE_URL", DEFAULT_CHAT_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                model: vars.string_or("CHAT_MODEL", DEFAULT_CHAT_MODEL),
                max_tokens: vars.parse_or("CHAT_MAX_TOKENS", 500)?,
                temperature: vars.parse_or("CHAT_TEMPERATURE", 0.7)?,
                timeout_secs: vars.parse_or("CHAT_TIMEOUT_SECS", 60)?,
            },
            feed: FeedConfig {
                page_size: vars.parse_or("FEED_PAGE_SIZE", 20)?,
                max_page_size: vars.parse_or("FEED_MAX_PAGE_SIZE", 100)?,
                mood_match_limit: vars.parse_or("MOOD_MATCH_LIMIT", 50)?,
            },
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(key))
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
