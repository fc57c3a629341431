use sqlx::PgExecutor;

use crate::database::models::SubCategory;
use crate::database::DatabaseError;

const JOINED_SELECT: &str = "SELECT s.id, s.name, s.description, s.category_id, c.name AS category_name \
     FROM subcategories s JOIN categories c ON c.id = s.category_id";

const RETURNING: &str = "RETURNING id, name, description, category_id";

pub async fn insert<'e, E>(
    db: E,
    category_id: i32,
    name: &str,
    description: &str,
) -> Result<SubCategory, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO subcategories (name, description, category_id) VALUES ($1, $2, $3) {}",
        RETURNING
    );
    Ok(sqlx::query_as::<_, SubCategory>(&sql)
        .bind(name)
        .bind(description)
        .bind(category_id)
        .fetch_one(db)
        .await?)
}

/// All sub-categories with their category name, ordered by category then name.
pub async fn fetch_all<'e, E>(db: E) -> Result<Vec<SubCategory>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} ORDER BY c.name, s.name", JOINED_SELECT);
    Ok(sqlx::query_as::<_, SubCategory>(&sql).fetch_all(db).await?)
}

pub async fn fetch_by_category<'e, E>(
    db: E,
    category_id: i32,
) -> Result<Vec<SubCategory>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} WHERE s.category_id = $1 ORDER BY s.name", JOINED_SELECT);
    Ok(sqlx::query_as::<_, SubCategory>(&sql)
        .bind(category_id)
        .fetch_all(db)
        .await?)
}

pub async fn fetch_by_id<'e, E>(db: E, id: i32) -> Result<Option<SubCategory>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} WHERE s.id = $1", JOINED_SELECT);
    Ok(sqlx::query_as::<_, SubCategory>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn update_by_id<'e, E>(
    db: E,
    id: i32,
    category_id: i32,
    name: &str,
    description: &str,
) -> Result<Option<SubCategory>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE subcategories SET name = $1, description = $2, category_id = $3 WHERE id = $4 {}",
        RETURNING
    );
    Ok(sqlx::query_as::<_, SubCategory>(&sql)
        .bind(name)
        .bind(description)
        .bind(category_id)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn delete_by_id<'e, E>(db: E, id: i32) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count<'e, E>(db: E) -> Result<i64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subcategories")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn name_exists<'e, E>(
    db: E,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM subcategories WHERE name = $1 AND ($2::INT IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}
