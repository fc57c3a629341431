// Handlers are split by tier: public routes, and protected routes behind the session gate.
pub mod protected;
pub mod public;

use crate::error::ApiError;
use crate::schemas::parse_id;

/// Parse a path id or answer 400.
pub(crate) fn path_id(raw: &str) -> Result<i32, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid id '{}'", raw)))
}
