use serde::Deserialize;
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,

    /// Port number to bind to (e.g., 3000)
    pub port: u16,

    /// Path prefix the API routes are mounted under (e.g., "/api"); empty for the root
    pub api_prefix: String,

    /// Directory of front-end assets served for paths no route matches
    pub static_dir: Option<PathBuf>,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Validate server configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !self.api_prefix.is_empty()
            && (!self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/'))
        {
            return Err(
                "API_PREFIX must be empty or start with '/' and not end with '/'".to_string(),
            );
        }

        // A root-mounted `/{short_code}` route would shadow every root-level asset
        if self.static_dir.is_some() && self.api_prefix.is_empty() {
            return Err("STATIC_DIR requires a non-empty API_PREFIX (e.g., \"/api\")".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Address to bind the listener to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
