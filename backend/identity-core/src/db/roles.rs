/// Role definition queries
use super::bounded;
use crate::error::Result;
use crate::models::RoleDefinition;
use sqlx::PgPool;
use std::time::Duration;

/// Load the full role table, for seeding or refreshing a `RoleDirectory`.
pub async fn load_role_definitions(
    pool: &PgPool,
    op_timeout: Duration,
) -> Result<Vec<RoleDefinition>> {
    let roles = bounded(
        op_timeout,
        sqlx::query_as::<_, RoleDefinition>(
            r#"
            SELECT name, permissions
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(pool),
    )
    .await?;

    Ok(roles)
}

/// Look up a single role by name.
pub async fn find_role(
    pool: &PgPool,
    name: &str,
    op_timeout: Duration,
) -> Result<Option<RoleDefinition>> {
    let role = bounded(
        op_timeout,
        sqlx::query_as::<_, RoleDefinition>(
            r#"
            SELECT name, permissions
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool),
    )
    .await?;

    Ok(role)
}
