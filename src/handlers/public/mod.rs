// Public handlers (no authentication required)
pub mod categories;
pub mod dashboard;
pub mod home;
pub mod products;
pub mod session;
pub mod sub_categories;
