use serde::Deserialize;

/// Short code generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UrlConfig {
    /// Length of randomly generated short codes
    pub short_code_length: usize,

    /// Maximum number of codes tried when the generated one is already taken
    pub short_code_max_attempts: u32,
}

impl UrlConfig {
    /// Validate URL configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.short_code_length < 4 || self.short_code_length > 16 {
            return Err("SHORT_CODE_LENGTH must be between 4 and 16".to_string());
        }

        if self.short_code_max_attempts < 1 || self.short_code_max_attempts > 100 {
            return Err("SHORT_CODE_MAX_ATTEMPTS must be between 1 and 100".to_string());
        }

        Ok(())
    }
}
