use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category_id: i32,
    /// Only present on joined read projections.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}
