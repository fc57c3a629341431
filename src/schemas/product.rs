//! Product multipart form: coercion of text fields, validation, and the
//! scalar-or-list normalization that form encodings force on repeated fields.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use super::{check, push_error, FieldErrors};
use crate::database::models::ProductState;
use crate::media::ImageUpload;

pub const MAX_PRICE: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);

/// A form value that may have been sent once or repeated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Add another occurrence, promoting a scalar to a list.
    pub fn push(self, value: T) -> Self {
        match self {
            OneOrMany::One(first) => OneOrMany::Many(vec![first, value]),
            OneOrMany::Many(mut values) => {
                values.push(value);
                OneOrMany::Many(values)
            }
        }
    }

    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.first(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// `"url"` -> `["url"]`, list -> list, absent -> `[]`; blank entries are dropped.
pub fn normalize_deleted_images(value: Option<OneOrMany<String>>) -> Vec<String> {
    value
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Raw multipart payload: text fields by name plus uploaded image files.
#[derive(Debug, Default)]
pub struct ProductForm {
    fields: HashMap<String, OneOrMany<String>>,
    pub files: Vec<ImageUpload>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let next = match self.fields.remove(&name) {
            Some(existing) => existing.push(value),
            None => OneOrMany::One(value),
        };
        self.fields.insert(name, next);
    }

    pub fn push_file(&mut self, file: ImageUpload) {
        self.files.push(file);
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.push_text(name, value);
        self
    }

    pub fn with_file(mut self, file: ImageUpload) -> Self {
        self.push_file(file);
        self
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    fn take(&mut self, name: &str) -> Option<OneOrMany<String>> {
        self.fields.remove(name)
    }

    /// Coerce and validate the fields shared by create and update.
    pub fn product_input(&self) -> Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.text("name").unwrap_or_default().trim().to_string();
        let description = self
            .text("description")
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let brand = self.text("brand").unwrap_or_default().trim().to_string();
        if name.is_empty() {
            push_error(&mut errors, "name", "Name is required");
        }
        if brand.is_empty() {
            push_error(&mut errors, "brand", "Brand is required");
        }

        let sub_category_id = match self.text("subCategoryId").map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<i32>() {
                Ok(id) if id > 0 => id,
                _ => {
                    push_error(&mut errors, "subCategoryId", "Select a sub-category");
                    0
                }
            },
            _ => {
                push_error(&mut errors, "subCategoryId", "Select a sub-category");
                0
            }
        };

        let original_price = match self.text("originalPrice").map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<Decimal>() {
                Ok(price) => {
                    validate_price(price, &mut errors);
                    price
                }
                Err(_) => {
                    push_error(&mut errors, "originalPrice", "Price must be a number");
                    Decimal::ZERO
                }
            },
            _ => {
                push_error(&mut errors, "originalPrice", "Price is required");
                Decimal::ZERO
            }
        };

        let discount = match self.text("discount").map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<Decimal>() {
                Ok(discount) => {
                    validate_discount(discount, &mut errors);
                    discount
                }
                Err(_) => {
                    push_error(&mut errors, "discount", "Discount must be a number");
                    Decimal::ZERO
                }
            },
            _ => Decimal::ZERO,
        };

        let input = ProductInput {
            name,
            description,
            sub_category_id,
            original_price,
            discount,
            brand,
        };
        check(&input, &mut errors);

        if errors.is_empty() {
            Ok(input)
        } else {
            Err(errors)
        }
    }

    /// Create adds nothing beyond the shared fields.
    pub fn into_create(self) -> Result<(ProductInput, Vec<ImageUpload>), FieldErrors> {
        let input = self.product_input()?;
        Ok((input, self.files))
    }

    /// Update additionally requires `state` and accepts `deletedImages`.
    pub fn into_update(mut self) -> Result<(ProductUpdate, Vec<ImageUpload>), FieldErrors> {
        let shared = self.product_input();

        let mut errors = match &shared {
            Ok(_) => FieldErrors::new(),
            Err(e) => e.clone(),
        };

        let state = match self.text("state") {
            Some(raw) => raw.parse::<ProductState>().unwrap_or_else(|message| {
                push_error(&mut errors, "state", message);
                ProductState::Available
            }),
            None => {
                push_error(&mut errors, "state", "state is required");
                ProductState::Available
            }
        };

        let deleted_images = normalize_deleted_images(self.take("deletedImages"));

        match shared {
            Ok(input) if errors.is_empty() => Ok((
                ProductUpdate {
                    input,
                    state,
                    deleted_images,
                },
                self.files,
            )),
            _ => Err(errors),
        }
    }
}

fn validate_price(price: Decimal, errors: &mut FieldErrors) {
    if price <= Decimal::ZERO {
        push_error(errors, "originalPrice", "Price must be greater than 0");
    }
    if price > MAX_PRICE {
        push_error(errors, "originalPrice", "Price cannot exceed 10000");
    }
    if price.normalize().scale() > 2 {
        push_error(errors, "originalPrice", "Price can have at most 2 decimal places");
    }
}

fn validate_discount(discount: Decimal, errors: &mut FieldErrors) {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        push_error(errors, "discount", "Discount must be between 0 and 100");
    }
    if discount.normalize().scale() > 2 {
        push_error(errors, "discount", "Discount can have at most 2 decimal places");
    }
}

/// Validated product fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductInput {
    #[validate(length(max = 150, message = "Name cannot exceed 150 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    pub sub_category_id: i32,
    pub original_price: Decimal,
    pub discount: Decimal,
    #[validate(length(max = 75, message = "Brand cannot exceed 75 characters"))]
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub input: ProductInput,
    pub state: ProductState,
    pub deleted_images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm::new()
            .with_text("name", "  Desk Lamp ")
            .with_text("description", "Warm light")
            .with_text("subCategoryId", "3")
            .with_text("originalPrice", "100.00")
            .with_text("discount", "25")
            .with_text("brand", "Acme")
    }

    #[test]
    fn single_deleted_image_becomes_list() {
        let value = Some(OneOrMany::One("url1".to_string()));
        assert_eq!(normalize_deleted_images(value), vec!["url1".to_string()]);
    }

    #[test]
    fn absent_deleted_images_is_empty() {
        assert!(normalize_deleted_images(None).is_empty());
    }

    #[test]
    fn deleted_images_deserialize_from_scalar_or_array() {
        let one: OneOrMany<String> = serde_json::from_str("\"url1\"").unwrap();
        let many: OneOrMany<String> = serde_json::from_str("[\"url1\",\"url2\"]").unwrap();
        assert_eq!(normalize_deleted_images(Some(one)), vec!["url1"]);
        assert_eq!(normalize_deleted_images(Some(many)), vec!["url1", "url2"]);
    }

    #[test]
    fn repeated_form_field_promotes_to_list() {
        let form = valid_form()
            .with_text("state", "available")
            .with_text("deletedImages", "a")
            .with_text("deletedImages", "b");
        let (update, files) = form.into_update().unwrap();
        assert_eq!(update.deleted_images, vec!["a", "b"]);
        assert!(files.is_empty());
    }

    #[test]
    fn coerces_and_trims_fields() {
        let input = valid_form().product_input().unwrap();
        assert_eq!(input.name, "Desk Lamp");
        assert_eq!(input.sub_category_id, 3);
        assert_eq!(input.original_price, "100".parse::<Decimal>().unwrap());
        assert_eq!(input.discount, Decimal::from(25));
    }

    #[test]
    fn discount_defaults_to_zero() {
        let mut form = ProductForm::new();
        form.push_text("name", "Chair");
        form.push_text("subCategoryId", "1");
        form.push_text("originalPrice", "49.90");
        form.push_text("brand", "Acme");
        let input = form.product_input().unwrap();
        assert_eq!(input.discount, Decimal::ZERO);
        assert!(input.description.is_none());
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = ProductForm::new()
            .with_text("originalPrice", "-5")
            .with_text("discount", "150")
            .product_input()
            .unwrap_err();

        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("brand"));
        assert!(errors.contains_key("subCategoryId"));
        assert_eq!(errors["originalPrice"], vec!["Price must be greater than 0"]);
        assert_eq!(errors["discount"], vec!["Discount must be between 0 and 100"]);
    }

    #[test]
    fn rejects_sub_cent_prices_and_overlong_names() {
        let mut form = ProductForm::new();
        form.push_text("name", "x".repeat(151));
        form.push_text("subCategoryId", "1");
        form.push_text("originalPrice", "10.001");
        form.push_text("brand", "Acme");
        let errors = form.product_input().unwrap_err();
        assert_eq!(errors["name"], vec!["Name cannot exceed 150 characters"]);
        assert_eq!(
            errors["originalPrice"],
            vec!["Price can have at most 2 decimal places"]
        );
    }

    #[test]
    fn rejects_sub_hundredth_discounts() {
        let mut form = ProductForm::new();
        form.push_text("name", "Lamp");
        form.push_text("subCategoryId", "1");
        form.push_text("originalPrice", "10");
        form.push_text("brand", "Acme");
        form.push_text("discount", "33.335");
        let errors = form.product_input().unwrap_err();
        assert_eq!(errors["discount"], vec!["Discount can have at most 2 decimal places"]);

        let mut form = ProductForm::new();
        form.push_text("name", "Lamp");
        form.push_text("subCategoryId", "1");
        form.push_text("originalPrice", "10");
        form.push_text("brand", "Acme");
        form.push_text("discount", "33.50");
        assert_eq!(form.product_input().unwrap().discount, "33.5".parse::<Decimal>().unwrap());
    }

    #[test]
    fn first_value_wins_for_scalar_fields() {
        let input = valid_form()
            .with_text("name", "Other")
            .product_input()
            .unwrap();
        assert_eq!(input.name, "Desk Lamp");
    }

    #[test]
    fn update_requires_state() {
        let errors = valid_form().into_update().unwrap_err();
        assert_eq!(errors["state"], vec!["state is required"]);

        let errors = valid_form().with_text("state", "gone").into_update().unwrap_err();
        assert!(errors["state"][0].contains("Invalid state"));
    }
}
