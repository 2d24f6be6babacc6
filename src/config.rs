use serde::{Deserialize, Serialize};

use crate::service::MatchConfig;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://inventory.db".to_string()),
            },
            matching: MatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let matching_defaults = MatchConfig::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://inventory.db".to_string()),
            },
            matching: MatchConfig {
                high_threshold: env_parsed(
                    "MATCH_HIGH_THRESHOLD",
                    matching_defaults.high_threshold,
                ),
                low_threshold: env_parsed("MATCH_LOW_THRESHOLD", matching_defaults.low_threshold),
                ambiguity_delta: env_parsed(
                    "MATCH_AMBIGUITY_DELTA",
                    matching_defaults.ambiguity_delta,
                ),
                top_n: env_parsed("MATCH_TOP_N", matching_defaults.top_n),
            },
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
