/// Data models for identity and authentication
pub mod role;
pub mod session;
pub mod user;

pub use role::RoleDefinition;
pub use session::{RotationOutcome, Session};
pub use user::UserAccount;
