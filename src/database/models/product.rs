use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::pricing::discounted_price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_state")]
pub enum ProductState {
    #[default]
    #[sqlx(rename = "available")]
    #[serde(rename = "available")]
    Available,
    #[sqlx(rename = "sold out")]
    #[serde(rename = "sold out")]
    SoldOut,
}

impl ProductState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductState::Available => "available",
            ProductState::SoldOut => "sold out",
        }
    }
}

impl fmt::Display for ProductState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "available" => Ok(ProductState::Available),
            "sold out" => Ok(ProductState::SoldOut),
            other => Err(format!("Invalid state '{}', expected 'available' or 'sold out'", other)),
        }
    }
}

/// Admin listing projection, joined with category and sub-category names.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdmin {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub discount: Decimal,
    pub brand: String,
    pub sub_category_id: i32,
    pub category_id: i32,
    pub state: ProductState,
    pub original_price: Decimal,
    pub images: Vec<String>,
    pub category_name: String,
    pub sub_category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub discounted_price: Decimal,
}

impl ProductAdmin {
    pub fn priced(mut self) -> Self {
        self.discounted_price = discounted_price(self.original_price, Some(self.discount));
        self
    }
}

/// Admin detail projection; also the baseline the update workflow diffs against.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailAdmin {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub discount: Decimal,
    pub brand: String,
    pub sub_category_id: i32,
    pub category_id: i32,
    pub state: ProductState,
    pub original_price: Decimal,
    pub images: Vec<String>,
}

/// Public listing projection: first image only, available products.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub discount: Decimal,
    pub brand: String,
    pub original_price: Decimal,
    pub image: String,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub discounted_price: Decimal,
}

impl ProductSummary {
    pub fn priced(mut self) -> Self {
        self.discounted_price = discounted_price(self.original_price, Some(self.discount));
        self
    }
}

/// Public detail projection.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub discount: Decimal,
    pub brand: String,
    pub sub_category_id: i32,
    pub category_id: i32,
    pub original_price: Decimal,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub discounted_price: Decimal,
}

impl ProductDetail {
    pub fn priced(mut self) -> Self {
        self.discounted_price = discounted_price(self.original_price, Some(self.discount));
        self
    }
}

/// Bare product row as returned by `UPDATE ... RETURNING`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub sub_category_id: i32,
    pub original_price: Decimal,
    pub discount: Decimal,
    pub brand: String,
    pub state: ProductState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub discounted_price: Decimal,
}

impl ProductRow {
    pub fn priced(mut self) -> Self {
        self.discounted_price = discounted_price(self.original_price, Some(self.discount));
        self
    }
}

/// Summary returned by a committed create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub id: i32,
    pub name: String,
    pub original_price: Decimal,
    pub discount: Decimal,
    pub discounted_price: Decimal,
    pub images: Vec<String>,
}
