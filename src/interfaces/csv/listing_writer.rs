use crate::domain::cart::CartLine;
use crate::domain::catalog::{Product, ProductStatus};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ProductRow<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    price: String,
    status: ProductStatus,
}

#[derive(Serialize)]
struct CartRow<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    price: String,
    quantity: u32,
}

/// Writes catalog listings and cart lines as CSV.
pub struct ListingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// `id,name,category,price,status`
    pub fn write_products<'a>(
        &mut self,
        products: impl IntoIterator<Item = &'a Product>,
    ) -> Result<()> {
        let mut empty = true;
        for product in products {
            empty = false;
            self.writer.serialize(ProductRow {
                id: &product.id,
                name: &product.name,
                category: &product.category,
                price: product.price.to_string(),
                status: product.status,
            })?;
        }
        if empty {
            self.writer
                .write_record(["id", "name", "category", "price", "status"])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// `id,name,category,price,quantity`
    pub fn write_cart(&mut self, lines: &[CartLine]) -> Result<()> {
        if lines.is_empty() {
            self.writer
                .write_record(["id", "name", "category", "price", "quantity"])?;
        }
        for line in lines {
            self.writer.serialize(CartRow {
                id: &line.item.id,
                name: &line.item.name,
                category: &line.item.category,
                price: line.item.price.to_string(),
                quantity: line.quantity,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}
