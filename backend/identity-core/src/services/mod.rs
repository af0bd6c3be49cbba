/// Business logic for login, refresh, and logout flows
pub mod auth;

pub use auth::AuthService;
