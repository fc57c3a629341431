use sqlx::PgExecutor;

use crate::database::models::{User, UserRole};
use crate::database::DatabaseError;

pub async fn find_by_email<'e, E>(db: E, email: &str) -> Result<Option<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    Ok(sqlx::query_as::<_, User>(
        "SELECT id, username, email, password, role FROM users WHERE LOWER(email) = LOWER($1)",
    )
    .bind(email.trim())
    .fetch_optional(db)
    .await?)
}

/// `password_hash` must already be a bcrypt hash.
pub async fn insert<'e, E>(
    db: E,
    username: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<User, DatabaseError>
where
    E: PgExecutor<'e>,
{
    Ok(sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password, role) VALUES ($1, $2, $3, $4) \
         RETURNING id, username, email, password, role",
    )
    .bind(username)
    .bind(email.trim())
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(db)
    .await?)
}
