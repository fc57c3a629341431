//! Per-entity data access. Every function is one round trip and accepts any Postgres
//! executor, so the same call works against the pool or inside a workflow transaction.
//! "Not found" is `None` / `false`, never an error.

pub mod category_service;
pub mod dashboard_service;
pub mod image_service;
pub mod pagination;
pub mod product_service;
pub mod sub_category_service;
pub mod user_service;

pub use pagination::{PageQuery, Pagination};
