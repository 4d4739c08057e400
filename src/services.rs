pub mod short_code;
pub mod url_service;

pub use short_code::{CodeGenerator, NanoidGenerator};
pub use url_service::{CreateOutcome, UrlService};
