/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、署名鍵など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 署名鍵はここで一度だけ読み込み、プロセスの生存期間中は変更しない
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// HS512 wants at least a full 512-bit key.
pub const MIN_SIGNING_KEY_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None -> in-memory stores
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub cors_allowed_origins: Vec<String>,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub jwt_signing_key: Vec<u8>,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    pub blob_root: PathBuf,

    pub max_body_bytes: usize,
    pub request_timeout: Duration,

    // Diagnostic mode: append fault descriptions to 500 envelopes.
    pub expose_fault_details: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material or connection strings
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.is_some())
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("blob_root", &self.blob_root)
            .field("expose_fault_details", &self.expose_fault_details)
            .finish()
    }
}

impl Config {
    /// Defaults for everything except the signing key.
    pub fn new(jwt_signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            app_env: AppEnv::Development,
            database_url: None,
            database_max_connections: 10,
            cors_allowed_origins: Vec::new(),
            auth_issuer: "SunsetStories".to_string(),
            auth_audience: "SunsetStories users".to_string(),
            jwt_signing_key: jwt_signing_key.into(),
            access_token_ttl_seconds: 3600,
            access_token_leeway_seconds: 0,
            blob_root: PathBuf::from("./data/blobs"),
            max_body_bytes: 10 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            expose_fault_details: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_signing_key = std::env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .into_bytes();
        if jwt_signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigError::Invalid("JWT_SIGNING_KEY"));
        }

        let mut config = Self::new(jwt_signing_key);

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        config.addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        config.app_env = AppEnv::from_env();

        config.database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        if let Ok(v) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            config.database_max_connections = v
                .parse()
                .map_err(|_| ConfigError::Invalid("DATABASE_MAX_CONNECTIONS"))?;
        }

        config.cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        if let Ok(issuer) = std::env::var("AUTH_ISSUER") {
            if issuer.trim().is_empty() {
                return Err(ConfigError::Invalid("AUTH_ISSUER"));
            }
            config.auth_issuer = issuer;
        }

        if let Ok(audience) = std::env::var("AUTH_AUDIENCE") {
            config.auth_audience = audience;
        }

        if let Ok(v) = std::env::var("ACCESS_TOKEN_TTL_SECONDS") {
            config.access_token_ttl_seconds = v
                .parse::<u64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))?;
        }

        config.access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        if let Ok(root) = std::env::var("BLOB_ROOT") {
            config.blob_root = PathBuf::from(root);
        }

        config.max_body_bytes = std::env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(config.max_body_bytes);

        config.request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.request_timeout);

        config.expose_fault_details = std::env::var("EXPOSE_FAULT_DETAILS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(config)
    }
}
