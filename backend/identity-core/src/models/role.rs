use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named set of permission strings.
///
/// Permissions are opaque capability strings compared for set membership
/// only; the evaluator attaches no meaning to their contents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleDefinition {
    pub name: String,
    pub permissions: Vec<String>,
}

impl RoleDefinition {
    pub fn new(name: impl Into<String>, permissions: &[&str]) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}
