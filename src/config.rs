use std::env;

use thiserror::Error;
use tracing::warn;

use crate::auth::PasswordScheme;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct WechatConfig {
    pub app_id: String,
    pub app_secret: String,
}

/// Process configuration, read once from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    pub request_timeout_secs: u64,
    pub upload_dir: String,
    pub password_scheme: PasswordScheme,
    pub wechat: WechatConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production)");
            "default-secret-change-in-production".to_string()
        });

        let jwt_expiration_hours = parse_or("JWT_EXPIRATION_HOURS", 24)?;
        let port = parse_or("PORT", 8080)?;
        let request_timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", 30)?;

        let password_scheme = match env::var("PASSWORD_SCHEME") {
            Ok(value) => PasswordScheme::parse(&value).ok_or(ConfigError::Invalid {
                key: "PASSWORD_SCHEME",
                value,
            })?,
            Err(_) => PasswordScheme::Sha256,
        };

        let wechat = WechatConfig {
            app_id: env::var("WECHAT_APP_ID").unwrap_or_default(),
            app_secret: env::var("WECHAT_APP_SECRET").unwrap_or_default(),
        };
        if wechat.app_id.is_empty() {
            warn!("WECHAT_APP_ID not set, mini-program login will not work");
        }

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
            request_timeout_secs,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            password_scheme,
            wechat,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
