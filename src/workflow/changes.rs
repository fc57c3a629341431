use crate::database::models::ProductDetailAdmin;
use crate::pricing::cents;
use crate::schemas::product::ProductUpdate;

/// Names of the fields an update would change. Prices and discounts are compared at cent
/// precision so `10` and `10.00` are equal.
pub fn changed_fields(
    current: &ProductDetailAdmin,
    update: &ProductUpdate,
    has_new_files: bool,
) -> Vec<&'static str> {
    let input = &update.input;
    let mut changed = vec![];

    if current.name != input.name {
        changed.push("name");
    }
    if current.description.as_deref().unwrap_or("") != input.description.as_deref().unwrap_or("") {
        changed.push("description");
    }
    if current.sub_category_id != input.sub_category_id {
        changed.push("subCategoryId");
    }
    if cents(current.original_price) != cents(input.original_price) {
        changed.push("originalPrice");
    }
    if cents(current.discount) != cents(input.discount) {
        changed.push("discount");
    }
    if current.brand != input.brand {
        changed.push("brand");
    }
    if current.state != update.state {
        changed.push("state");
    }
    if !update.deleted_images.is_empty() {
        changed.push("deletedImages");
    }
    if has_new_files {
        changed.push("imgs");
    }
    changed
}
