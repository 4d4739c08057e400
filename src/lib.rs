//! # linkmap
//!
//! Maps long URLs to short codes and resolves them back, counting accesses.
//!
//! - [`services::UrlService`] owns the mapping lifecycle: create, fetch,
//!   update, delete, stats and redirect.
//! - [`db::UrlRepository`] is the storage boundary, implemented for
//!   PostgreSQL ([`db::PgRepository`]) and in memory ([`db::MemoryRepository`]).
//! - [`routes::create_router`] exposes the service over HTTP.
//!
//! Configuration is read from environment variables by [`config::Config`].

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;
