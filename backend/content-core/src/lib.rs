/// Content Core Library
///
/// Keyset pagination engine and content repository surface for the Quill
/// backend, plus the blob storage gateway holding referenced media.
///
/// ## Modules
///
/// - `config`: Settings loaded from the environment
/// - `db`: Content storage (Postgres + in-memory)
/// - `error`: Error types
/// - `models`: Data models
/// - `pagination`: Signed cursors and stable page building
/// - `storage`: Blob storage gateway (S3 + in-memory)
/// - `services`: Token-gated list/create/delete flows
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use error::{ContentError, Result};
pub use models::{BlobReference, ContentItem, ContentStatus, NewContentItem, Page, PageKey};
pub use pagination::{ContentFilter, CursorCodec, PageBuilder, QuerySignature, SortOrder};
pub use services::ContentService;
