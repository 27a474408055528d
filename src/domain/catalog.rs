use super::cart::CartItem;
use super::price::Price;
use crate::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Draft,
    Inactive,
}

/// A merchant listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub status: ProductStatus,
}

impl Product {
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price.clone(),
            image: self.image.clone(),
            category: self.category.clone(),
            token_id: self.token_id.clone(),
            is_private: Some(self.is_private),
        }
    }

    fn matches_text(&self, needle: &str) -> bool {
        [&self.name, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently listed first.
    #[default]
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
    Name,
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub status: Option<ProductStatus>,
    pub sort: SortOrder,
}

/// Merchant product list, ordered by listing time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Lists a new product. Ids are unique and every price must be in `unit`.
    pub fn add(&mut self, product: Product, unit: &str) -> Result<()> {
        check_unit(&product, unit)?;
        if self.get(&product.id).is_some() {
            return Err(StorefrontError::DuplicateProduct(product.id));
        }
        self.products.push(product);
        Ok(())
    }

    /// Replaces the listing with the same id, keeping its position.
    pub fn update(&mut self, product: Product, unit: &str) -> Result<()> {
        check_unit(&product, unit)?;
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| StorefrontError::UnknownProduct(product.id.clone()))?;
        *slot = product;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.to_string()))?;
        Ok(self.products.remove(index))
    }

    pub fn set_status(&mut self, id: &str, status: ProductStatus) -> Result<()> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.to_string()))?;
        product.status = status;
        Ok(())
    }

    /// Fails on the first listing not priced in `unit`.
    pub fn check_units(&self, unit: &str) -> Result<()> {
        self.products
            .iter()
            .try_for_each(|product| check_unit(product, unit))
    }

    /// Distinct categories in first-listed order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }

    pub fn search(&self, query: &CatalogQuery) -> Vec<&Product> {
        let needle = query.search.as_ref().map(|s| s.trim().to_lowercase());
        let mut found: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches_text(n)))
            .filter(|p| query.category.as_deref().is_none_or(|c| p.category == c))
            .filter(|p| query.min_price.is_none_or(|min| p.price.amount() >= min))
            .filter(|p| query.max_price.is_none_or(|max| p.price.amount() <= max))
            .filter(|p| query.status.is_none_or(|s| p.status == s))
            .collect();

        match query.sort {
            SortOrder::Newest => found.reverse(),
            SortOrder::PriceLowToHigh => found.sort_by(|a, b| by_price(a, b)),
            SortOrder::PriceHighToLow => found.sort_by(|a, b| by_price(b, a)),
            SortOrder::Name => found.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        found
    }

    /// Listings a fresh storefront starts with.
    pub fn demo(unit: &str) -> Result<Self> {
        let listings = [
            ("1", "Cosmic Dreams NFT", dec!(2.5), "Digital Art", "NFT001", false),
            ("2", "DeFi Yield Optimizer", dec!(0.8), "Smart Contracts", "SC002", false),
            ("3", "Metaverse Land Plot", dec!(5.2), "Virtual Real Estate", "LAND003", false),
            ("4", "Legendary Sword Skin", dec!(1.2), "Gaming", "GAME004", false),
            ("5", "Liquidity Pool Access", dec!(0.5), "DeFi", "DEFI005", true),
            ("6", "Exclusive Album Drop", dec!(3.0), "Music", "MUSIC006", false),
        ];

        let mut catalog = Self::new();
        for (id, name, amount, category, token_id, is_private) in listings {
            catalog.add(
                Product {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: String::new(),
                    price: Price::new(amount, unit)?,
                    image: format!("/images/products/{id}.png"),
                    category: category.to_string(),
                    token_id: Some(token_id.to_string()),
                    is_private,
                    status: ProductStatus::Active,
                },
                unit,
            )?;
        }
        Ok(catalog)
    }
}

fn check_unit(product: &Product, unit: &str) -> Result<()> {
    if product.price.unit() == unit {
        Ok(())
    } else {
        Err(StorefrontError::UnitMismatch {
            expected: unit.to_string(),
            found: product.price.unit().to_string(),
        })
    }
}

fn by_price(a: &Product, b: &Product) -> Ordering {
    a.price.amount().cmp(&b.price.amount())
}
