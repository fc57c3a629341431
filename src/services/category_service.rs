use sqlx::PgExecutor;

use crate::database::models::Category;
use crate::database::DatabaseError;

const COLUMNS: &str = "id, name, description";

pub async fn insert<'e, E>(db: E, name: &str, description: &str) -> Result<Category, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {}",
        COLUMNS
    );
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(name)
        .bind(description)
        .fetch_one(db)
        .await?;
    Ok(category)
}

/// Newest first
pub async fn fetch_all<'e, E>(db: E) -> Result<Vec<Category>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM categories ORDER BY created_at DESC, id DESC",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Category>(&sql).fetch_all(db).await?)
}

pub async fn fetch_by_id<'e, E>(db: E, id: i32) -> Result<Option<Category>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {} FROM categories WHERE id = $1", COLUMNS);
    Ok(sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn update_by_id<'e, E>(
    db: E,
    id: i32,
    name: &str,
    description: &str,
) -> Result<Option<Category>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE categories SET name = $1, description = $2 WHERE id = $3 RETURNING {}",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Category>(&sql)
        .bind(name)
        .bind(description)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// `false` when no row had that id
pub async fn delete_by_id<'e, E>(db: E, id: i32) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count<'e, E>(db: E) -> Result<i64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Read-only duplicate check; `exclude_id` skips the row being renamed.
pub async fn name_exists<'e, E>(
    db: E,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE name = $1 AND ($2::INT IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}
