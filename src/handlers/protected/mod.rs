// Protected handlers (session token required, see middleware::require_auth)
pub mod admin_products;
pub mod profile;
