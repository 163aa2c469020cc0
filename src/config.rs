use std::env;

/// Per-IP rate limits for public endpoints, in requests per minute.
/// A value of 0 disables the limiter for that tier.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub activate_rpm: u32,
    pub relaxed_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            activate_rpm: 30,
            relaxed_rpm: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Bearer token for the admin API. Admin routes reject everything when unset.
    pub admin_api_key: Option<String>,
    pub dev_mode: bool,
    pub rate_limit: RateLimitConfig,
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("SEATKEEP_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let admin_api_key = env::var("ADMIN_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let defaults = RateLimitConfig::default();

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "seatkeep.db".to_string()),
            admin_api_key,
            dev_mode,
            rate_limit: RateLimitConfig {
                activate_rpm: env_u32("RATE_LIMIT_ACTIVATE_RPM", defaults.activate_rpm),
                relaxed_rpm: env_u32("RATE_LIMIT_RELAXED_RPM", defaults.relaxed_rpm),
            },
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
