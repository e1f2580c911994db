//! Catalog entities: phones and the brands they belong to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
}

/// A product's brand as it appears at the storage boundary: either a bare id
/// or the full record when the query joined it in.
///
/// JSON keeps the original shape (`"brand": 3` vs `"brand": {...}`); code
/// normalizes through [`BrandRef::id`] instead of matching everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandRef {
    Expanded(Brand),
    Reference(i64),
}

impl BrandRef {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            BrandRef::Expanded(brand) => brand.id,
            BrandRef::Reference(id) => *id,
        }
    }

    /// The brand's display name, when the record was expanded.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            BrandRef::Expanded(brand) => Some(&brand.name),
            BrandRef::Reference(_) => None,
        }
    }
}

/// Free-form spec sheet shown on the product detail page. Every field is
/// optional; the admin form fills in whatever is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: BrandRef,
    pub price: Decimal,
    pub stock: i32,
    pub description: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub specs: ProductSpecs,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("product name must be non-empty")]
    EmptyName,
    #[error("price cannot be negative")]
    NegativePrice,
}

/// Validates admin input for product create/update.
///
/// # Errors
///
/// Returns [`ProductError::EmptyName`] for a blank name and
/// [`ProductError::NegativePrice`] for a price below zero.
pub fn validate_product_input(name: &str, price: Decimal) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::EmptyName);
    }
    if price < Decimal::ZERO {
        return Err(ProductError::NegativePrice);
    }
    Ok(())
}
