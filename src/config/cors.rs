use serde::Deserialize;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// List of allowed origins for CORS (use ["*"] for all origins)
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Parse a comma separated origin list; "*" allows any origin
    pub fn parse(origins: &str) -> Self {
        let allowed_origins = if origins.trim() == "*" {
            vec!["*".to_string()]
        } else {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self { allowed_origins }
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}
