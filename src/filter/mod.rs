//! Product listing filter compiled to a parameterized WHERE clause.

pub mod product_filter;

pub use product_filter::{FilterParam, ProductFilter, SqlResult};
