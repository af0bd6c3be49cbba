/// Password hashing and token signing
pub mod password;
pub mod token;

pub use password::{CredentialStore, PasswordVerdict};
pub use token::{Claims, TokenKind, TokenPair, TokenService};
