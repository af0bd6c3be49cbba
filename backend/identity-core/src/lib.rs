/// Identity Core Library
///
/// Authentication and authorization core for the Quill backend: credential
/// storage, token issuance/verification, session rotation with reuse
/// detection, revocation, and role-based authorization.
///
/// ## Modules
///
/// - `config`: Settings loaded from the environment
/// - `db`: Account, session, and role storage (Postgres + in-memory)
/// - `error`: Error types
/// - `models`: Data models
/// - `authz`: Role directory and permission evaluation
/// - `revocation`: Session revocation registry (Redis + in-memory)
/// - `security`: Password hashing and token signing
/// - `services`: Login/refresh/logout flows
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod revocation;
pub mod security;
pub mod services;

// Re-export commonly used types
pub use authz::RoleDirectory;
pub use error::{IdentityError, Result};
pub use security::{Claims, CredentialStore, TokenKind, TokenPair, TokenService};
pub use services::AuthService;
