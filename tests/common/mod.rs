#![allow(dead_code)]

use axum_test::TestServer;
use linkmap::config::{CorsConfig, ServerConfig};
use linkmap::db::MemoryRepository;
use linkmap::routes::create_router;
use linkmap::services::{CodeGenerator, NanoidGenerator, UrlService};
use linkmap::state::AppState;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Hands out the given codes in order, then falls back to random ones
pub struct FixedCodes {
    codes: Mutex<VecDeque<String>>,
    fallback: NanoidGenerator,
}

impl FixedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            fallback: NanoidGenerator::new(8),
        }
    }
}

impl CodeGenerator for FixedCodes {
    fn generate(&self) -> String {
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.generate())
    }
}

pub fn server_config(api_prefix: &str, static_dir: Option<PathBuf>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_prefix: api_prefix.to_string(),
        static_dir,
        max_body_bytes: 16 * 1024,
    }
}

pub fn build_server(config: ServerConfig, codes: &[&str]) -> (TestServer, MemoryRepository) {
    let repository = MemoryRepository::new();
    let service = UrlService::new(
        Arc::new(repository.clone()),
        Arc::new(FixedCodes::new(codes)),
        10,
    );

    let app = create_router(
        Arc::new(AppState::new(service)),
        &config,
        &CorsConfig::parse("*"),
    );

    (TestServer::new(app).unwrap(), repository)
}

pub fn test_server(codes: &[&str]) -> (TestServer, MemoryRepository) {
    build_server(server_config("", None), codes)
}
