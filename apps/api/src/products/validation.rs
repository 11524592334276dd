use crate::donations::validation::normalize_currency;
use crate::errors::AppError;
use crate::validation::{bounded_text, optional_text, required_text};

pub const MAX_TITLE: usize = 120;
pub const MAX_DESCRIPTION: usize = 5000;
pub const MAX_CRAFT: usize = 60;
pub const MAX_STOCK: i32 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub craft: String,
    pub price_minor: i64,
    pub currency: String,
    pub stock: i32,
}

/// Validated partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub craft: Option<String>,
    pub price_minor: Option<i64>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        *self == ProductChanges::default()
    }
}

pub fn validate_price(price_minor: i64) -> Result<i64, AppError> {
    if price_minor < 0 {
        return Err(AppError::Validation("price_minor cannot be negative".to_string()));
    }
    Ok(price_minor)
}

pub fn validate_stock(stock: i32) -> Result<i32, AppError> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(AppError::Validation(format!(
            "stock must be between 0 and {MAX_STOCK}"
        )));
    }
    Ok(stock)
}

pub fn validate_new(
    title: &str,
    description: &str,
    craft: &str,
    price_minor: i64,
    currency: Option<&str>,
    stock: i32,
) -> Result<NewProduct, AppError> {
    Ok(NewProduct {
        title: required_text("title", title, MAX_TITLE)?,
        description: bounded_text("description", description, MAX_DESCRIPTION)?,
        craft: required_text("craft", craft, MAX_CRAFT)?,
        price_minor: validate_price(price_minor)?,
        currency: normalize_currency(currency)?,
        stock: validate_stock(stock)?,
    })
}

pub fn validate_changes(
    title: Option<&str>,
    description: Option<&str>,
    craft: Option<&str>,
    price_minor: Option<i64>,
    currency: Option<&str>,
    stock: Option<i32>,
    is_active: Option<bool>,
) -> Result<ProductChanges, AppError> {
    Ok(ProductChanges {
        title: title.map(|t| required_text("title", t, MAX_TITLE)).transpose()?,
        description: description
            .map(|d| bounded_text("description", d, MAX_DESCRIPTION))
            .transpose()?,
        craft: craft.map(|c| required_text("craft", c, MAX_CRAFT)).transpose()?,
        price_minor: price_minor.map(validate_price).transpose()?,
        currency: currency.map(|c| normalize_currency(Some(c))).transpose()?,
        stock: stock.map(validate_stock).transpose()?,
        is_active,
    })
}

/// Normalizes a free-text search term into an ILIKE pattern.
pub fn search_pattern(q: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(term) = optional_text("q", q, 100)? else {
        return Ok(None);
    };
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Ok(Some(format!("%{escaped}%")))
}
