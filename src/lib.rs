/// Pulse Social Service Library
///
/// Handles posts, comments, likes, and feed endpoints for the Pulse social
/// platform. Identity, upload handling, and token validation live in upstream
/// collaborators; this service owns the content graph and its consistency.
///
/// # Modules
///
/// - `handlers`: Content-related HTTP request handlers
/// - `models`: Data structures for posts, comments, likes, and feed pages
/// - `services`: Business logic layer
/// - `repository`: Database access layer and store traits
/// - `storage`: Image file cleanup under the public root
/// - `middleware`: Trusted-gateway authentication extractor
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
