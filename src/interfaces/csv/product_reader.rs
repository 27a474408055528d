use crate::domain::catalog::{Product, ProductStatus};
use crate::domain::price::Price;
use crate::error::{Result, StorefrontError};
use serde::Deserialize;
use std::io::Read;

/// One catalog row as it appears in an import file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
    pub category: String,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl ProductRecord {
    /// Validates the row. Bare prices are tagged with `unit`.
    pub fn into_product(self, unit: &str) -> Result<Product> {
        if self.id.is_empty() {
            return Err(StorefrontError::InvalidConfig(format!(
                "Product {:?} has an empty id",
                self.name
            )));
        }
        Ok(Product {
            price: Price::parse_with_default_unit(&self.price, unit)?,
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            category: self.category,
            token_id: self.token_id.filter(|t| !t.is_empty()),
            is_private: self.is_private.unwrap_or(false),
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Reads catalog rows from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing optional columns may be left out.
pub struct ProductReader<R: Read> {
    reader: csv::Reader<R>,
    unit: String,
}

impl<R: Read> ProductReader<R> {
    pub fn new(source: R, unit: impl Into<String>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self {
            reader,
            unit: unit.into(),
        }
    }

    /// Lazily reads and validates products, one result per row.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        let unit = self.unit;
        self.reader
            .into_deserialize::<ProductRecord>()
            .map(move |row| row.map_err(StorefrontError::from)?.into_product(&unit))
    }
}
