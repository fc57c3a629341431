use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

/// Bound value for a generated placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParam {
    Text(String),
    Int(i32),
    BigInt(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterParam>,
}

/// Shared by product listing and product counting so totals match the listed set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub available_only: bool,
    /// Only products with at least one image row.
    pub with_images: bool,
}

impl ProductFilter {
    pub fn public(search: Option<String>, category_id: Option<i32>) -> Self {
        Self {
            search,
            category_id,
            available_only: true,
            with_images: true,
        }
    }

    pub fn admin(search: Option<String>) -> Self {
        Self {
            search,
            category_id: None,
            available_only: false,
            with_images: false,
        }
    }

    /// `%term%` with LIKE metacharacters escaped, or `None` for a blank search.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        Some(format!("%{}%", escape_like(&term.to_lowercase())))
    }

    /// WHERE clause over the `p` (products) and `s` (subcategories) aliases.
    /// Placeholders are numbered from `$1`.
    pub fn to_where(&self) -> (String, Vec<FilterParam>) {
        let mut conditions = vec![];
        let mut params = vec![];

        if let Some(pattern) = self.search_pattern() {
            params.push(FilterParam::Text(pattern));
            let n = params.len();
            conditions.push(format!(
                "(LOWER(p.name) LIKE ${n} OR LOWER(COALESCE(p.description, '')) LIKE ${n})"
            ));
        }

        if let Some(category_id) = self.category_id {
            params.push(FilterParam::Int(category_id));
            conditions.push(format!("s.category_id = ${}", params.len()));
        }

        if self.available_only {
            conditions.push("p.state = 'available'".to_string());
        }

        if self.with_images {
            conditions.push(
                "EXISTS (SELECT 1 FROM product_images i WHERE i.product_id = p.id)".to_string(),
            );
        }

        let clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        (clause, params)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn bind_params<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [FilterParam],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for p in params {
        q = match p {
            FilterParam::Text(s) => q.bind(s.as_str()),
            FilterParam::Int(i) => q.bind(*i),
            FilterParam::BigInt(i) => q.bind(*i),
        };
    }
    q
}
