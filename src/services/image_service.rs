use sqlx::PgExecutor;

use crate::database::DatabaseError;

pub async fn insert<'e, E>(db: E, product_id: i32, url: &str) -> Result<i32, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO product_images (product_id, image_url) VALUES ($1, $2) RETURNING id",
    )
    .bind(product_id)
    .bind(url)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// In upload order
pub async fn urls_for_product<'e, E>(db: E, product_id: i32) -> Result<Vec<String>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT image_url FROM product_images WHERE product_id = $1 ORDER BY id",
    )
    .bind(product_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(url,)| url).collect())
}

pub async fn delete_by_url<'e, E>(db: E, product_id: i32, url: &str) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM product_images WHERE product_id = $1 AND image_url = $2")
        .bind(product_id)
        .bind(url)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
