use std::env;
use thiserror::Error;

pub const DEFAULT_BUCKET: &str = "service-images";
pub const PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1552733407-5d5c46c3bb3b?w=800&q=80";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_url: String,
    pub anon_key: String,
    /// When set, access tokens are verified locally instead of asking the auth service.
    pub jwt_secret: Option<String>,
    pub storage_bucket: String,
    pub site_url: String,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            supabase_url: String::new(),
            anon_key: String::new(),
            jwt_secret: None,
            storage_bucket: DEFAULT_BUCKET.to_string(),
            site_url: "http://localhost:3000".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let supabase_url = env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?
            .trim_end_matches('/')
            .to_string();
        let anon_key = env::var("SUPABASE_ANON_KEY").map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            Err(_) => defaults.port,
        };
        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { name: "HTTP_TIMEOUT_SECS", value: raw })?,
            Err(_) => defaults.http_timeout_secs,
        };

        Ok(Self {
            port,
            supabase_url,
            anon_key,
            jwt_secret: env::var("SUPABASE_JWT_SECRET").ok().filter(|s| !s.is_empty()),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or(defaults.storage_bucket),
            site_url: env::var("SITE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            http_timeout_secs,
        })
    }

    pub fn redirect_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.site_url, path)
        } else {
            format!("{}/{}", self.site_url, path)
        }
    }
}
