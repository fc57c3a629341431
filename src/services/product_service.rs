use sqlx::PgExecutor;

use crate::database::models::{
    ProductAdmin, ProductDetail, ProductDetailAdmin, ProductRow, ProductState, ProductSummary,
};
use crate::database::DatabaseError;
use crate::filter::product_filter::bind_params;
use crate::filter::{FilterParam, ProductFilter, SqlResult};
use crate::schemas::product::ProductInput;
use crate::services::pagination::Pagination;

const FROM_JOINED: &str = "FROM products p \
     JOIN subcategories s ON s.id = p.subcategory_id \
     JOIN categories c ON c.id = s.category_id";

const IMAGES: &str =
    "ARRAY(SELECT i.image_url FROM product_images i WHERE i.product_id = p.id ORDER BY i.id) AS images";

const FIRST_IMAGE: &str = "COALESCE((SELECT i.image_url FROM product_images i \
     WHERE i.product_id = p.id ORDER BY i.id LIMIT 1), '') AS image";

const ROW_COLUMNS: &str = "id, name, description, subcategory_id AS sub_category_id, \
     price AS original_price, discount, brand, state, created_at, updated_at";

fn admin_columns() -> String {
    format!(
        "p.id, p.name, p.description, p.discount, p.brand, p.subcategory_id AS sub_category_id, \
         s.category_id, p.state, p.price AS original_price, {}, c.name AS category_name, \
         s.name AS sub_category_name, p.created_at, p.updated_at",
        IMAGES
    )
}

fn paged(filter: &ProductFilter, columns: &str, page: &Pagination) -> SqlResult {
    let (clause, mut params) = filter.to_where();
    params.push(FilterParam::BigInt(page.limit));
    params.push(FilterParam::BigInt(page.offset()));
    let n = params.len();

    SqlResult {
        query: format!(
            "SELECT {} {} WHERE {} ORDER BY p.updated_at DESC, p.id DESC LIMIT ${} OFFSET ${}",
            columns,
            FROM_JOINED,
            clause,
            n - 1,
            n
        ),
        params,
    }
}

/// Insert a product row; `None` when the database returned no id.
pub async fn insert<'e, E>(db: E, input: &ProductInput) -> Result<Option<i32>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let id: Option<(i32,)> = sqlx::query_as(
        "INSERT INTO products (name, description, subcategory_id, price, discount, brand) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.sub_category_id)
    .bind(input.original_price)
    .bind(input.discount)
    .bind(&input.brand)
    .fetch_optional(db)
    .await?;
    Ok(id.map(|(id,)| id))
}

pub async fn fetch_admin_page<'e, E>(
    db: E,
    filter: &ProductFilter,
    page: &Pagination,
) -> Result<Vec<ProductAdmin>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = paged(filter, &admin_columns(), page);
    let rows = bind_params(sqlx::query_as::<_, ProductAdmin>(&sql.query), &sql.params)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(ProductAdmin::priced).collect())
}

pub async fn fetch_admin_detail<'e, E>(
    db: E,
    id: i32,
) -> Result<Option<ProductDetailAdmin>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT p.id, p.name, p.description, p.discount, p.brand, \
         p.subcategory_id AS sub_category_id, s.category_id, p.state, \
         p.price AS original_price, {} {} WHERE p.id = $1",
        IMAGES, FROM_JOINED
    );
    Ok(sqlx::query_as::<_, ProductDetailAdmin>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn fetch_summary_page<'e, E>(
    db: E,
    filter: &ProductFilter,
    page: &Pagination,
) -> Result<Vec<ProductSummary>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let columns = format!(
        "p.id, p.name, p.discount, p.brand, p.price AS original_price, {}, p.updated_at",
        FIRST_IMAGE
    );
    let sql = paged(filter, &columns, page);
    let rows = bind_params(sqlx::query_as::<_, ProductSummary>(&sql.query), &sql.params)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(ProductSummary::priced).collect())
}

pub async fn fetch_detail<'e, E>(db: E, id: i32) -> Result<Option<ProductDetail>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT p.id, p.name, p.description, p.discount, p.brand, \
         p.subcategory_id AS sub_category_id, s.category_id, \
         p.price AS original_price, {}, p.created_at {} WHERE p.id = $1",
        IMAGES, FROM_JOINED
    );
    let row = sqlx::query_as::<_, ProductDetail>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(ProductDetail::priced))
}

/// Overwrite every mutable column; `None` when no row had that id.
pub async fn update_by_id<'e, E>(
    db: E,
    id: i32,
    input: &ProductInput,
    state: ProductState,
) -> Result<Option<ProductRow>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE products SET name = $1, description = $2, subcategory_id = $3, price = $4, \
         discount = $5, brand = $6, state = $7 WHERE id = $8 RETURNING {}",
        ROW_COLUMNS
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.sub_category_id)
        .bind(input.original_price)
        .bind(input.discount)
        .bind(&input.brand)
        .bind(state)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(ProductRow::priced))
}

/// Image rows go with the product through `ON DELETE CASCADE`.
pub async fn delete_by_id<'e, E>(db: E, id: i32) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count<'e, E>(db: E, filter: &ProductFilter) -> Result<i64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let (clause, params) = filter.to_where();
    let sql = format!(
        "SELECT COUNT(*) FROM products p JOIN subcategories s ON s.id = p.subcategory_id WHERE {}",
        clause
    );
    let (count,): (i64,) = bind_params(sqlx::query_as(&sql), &params)
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
        "SELECT EXISTS (SELECT 1 FROM products WHERE name = $1 AND ($2::INT IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}
