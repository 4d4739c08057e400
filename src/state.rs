use crate::services::UrlService;

/// Application state shared across all HTTP handlers.
///
/// Wrapped in `Arc` and handed to handlers through Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The URL mapping service, holding the injected store and code generator
    pub url_service: UrlService,
}

impl AppState {
    pub fn new(url_service: UrlService) -> Self {
        Self { url_service }
    }
}
