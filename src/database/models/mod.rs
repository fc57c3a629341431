pub mod category;
pub mod product;
pub mod sub_category;
pub mod user;

pub use category::Category;
pub use product::{
    ProductAdmin, ProductCreated, ProductDetail, ProductDetailAdmin, ProductRow, ProductState,
    ProductSummary,
};
pub use sub_category::SubCategory;
pub use user::{User, UserRole};
