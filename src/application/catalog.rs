use crate::config::CATALOG_KEY;
use crate::domain::catalog::{Catalog, Product, ProductStatus};
use crate::domain::ports::LocalStorageBox;
use crate::error::{Result, StorefrontError};
use tracing::{debug, info};

/// Counts reported by [`CatalogService::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
}

/// Merchant-side product management, persisted next to the cart.
///
/// Unlike the cart, catalog writes are not fire-and-forget: a merchant edit
/// that fails to persist is reported.
pub struct CatalogService {
    catalog: Catalog,
    unit: String,
    storage: LocalStorageBox,
}

impl CatalogService {
    /// Loads the catalog, seeding the demo listings when none is stored yet.
    ///
    /// A stored catalog priced in another unit is refused with
    /// [`StorefrontError::UnitMismatch`].
    pub async fn load(storage: LocalStorageBox, unit: impl Into<String>) -> Result<Self> {
        let unit = unit.into();
        let catalog = match storage.get(CATALOG_KEY).await? {
            Some(bytes) => {
                let catalog: Catalog = serde_json::from_slice(&bytes)?;
                catalog.check_units(&unit)?;
                catalog
            }
            None => {
                debug!("No stored catalog, seeding demo listings");
                Catalog::demo(&unit)?
            }
        };
        Ok(Self {
            catalog,
            unit,
            storage,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Looks up a product that can be put in a cart.
    pub fn purchasable(&self, id: &str) -> Result<&Product> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.to_string()))?;
        if product.status != ProductStatus::Active {
            return Err(StorefrontError::InactiveProduct(id.to_string()));
        }
        Ok(product)
    }

    pub async fn add(&mut self, product: Product) -> Result<()> {
        info!(id = %product.id, "Listing product");
        self.catalog.add(product, &self.unit)?;
        self.save().await
    }

    pub async fn update(&mut self, product: Product) -> Result<()> {
        self.catalog.update(product, &self.unit)?;
        self.save().await
    }

    pub async fn remove(&mut self, id: &str) -> Result<Product> {
        let removed = self.catalog.remove(id)?;
        info!(id, "Delisted product");
        self.save().await?;
        Ok(removed)
    }

    pub async fn set_status(&mut self, id: &str, status: ProductStatus) -> Result<()> {
        self.catalog.set_status(id, status)?;
        self.save().await
    }

    /// Upserts every product. Nothing is saved unless all of them are valid.
    pub async fn import(&mut self, products: Vec<Product>) -> Result<ImportSummary> {
        let mut staged = self.catalog.clone();
        let mut summary = ImportSummary::default();
        for product in products {
            if staged.get(&product.id).is_some() {
                staged.update(product, &self.unit)?;
                summary.updated += 1;
            } else {
                staged.add(product, &self.unit)?;
                summary.added += 1;
            }
        }
        self.catalog = staged;
        self.save().await?;
        info!(added = summary.added, updated = summary.updated, "Catalog imported");
        Ok(summary)
    }

    async fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.catalog)?;
        self.storage.set(CATALOG_KEY, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::Price;
    use crate::infrastructure::in_memory::InMemoryStorage;

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Listing {id}"),
            description: String::new(),
            price: Price::parse(price).unwrap(),
            image: String::new(),
            category: "Software".to_string(),
            token_id: None,
            is_private: false,
            status: ProductStatus::Active,
        }
    }

    async fn service(storage: &InMemoryStorage) -> CatalogService {
        CatalogService::load(Box::new(storage.clone()), "ETH")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_storage_is_seeded() {
        let storage = InMemoryStorage::new();
        let service = service(&storage).await;
        assert_eq!(service.catalog().products().len(), 6);
    }

    #[tokio::test]
    async fn test_changes_survive_reload() {
        let storage = InMemoryStorage::new();
        {
            let mut service = service(&storage).await;
            service.add(product("new", "0.2 ETH")).await.unwrap();
            service.remove("1").await.unwrap();
            service.set_status("2", ProductStatus::Draft).await.unwrap();
        }

        let service = service(&storage).await;
        assert!(service.catalog().get("new").is_some());
        assert!(service.catalog().get("1").is_none());
        assert_eq!(
            service.catalog().get("2").unwrap().status,
            ProductStatus::Draft
        );
    }

    #[tokio::test]
    async fn test_purchasable_requires_active_listing() {
        let storage = InMemoryStorage::new();
        let mut service = service(&storage).await;
        service.set_status("3", ProductStatus::Inactive).await.unwrap();

        assert!(service.purchasable("1").is_ok());
        assert!(matches!(
            service.purchasable("3"),
            Err(StorefrontError::InactiveProduct(_))
        ));
        assert!(matches!(
            service.purchasable("nope"),
            Err(StorefrontError::UnknownProduct(_))
        ));
    }

    #[tokio::test]
    async fn test_stored_catalog_in_another_unit_is_refused() {
        let storage = InMemoryStorage::new();
        {
            let mut service = service(&storage).await;
            service.add(product("new", "0.2 ETH")).await.unwrap();
        }

        let result = CatalogService::load(Box::new(storage.clone()), "MATIC").await;
        assert!(matches!(
            result,
            Err(StorefrontError::UnitMismatch { ref expected, ref found })
                if expected == "MATIC" && found == "ETH"
        ));
        assert!(CatalogService::load(Box::new(storage.clone()), "ETH").await.is_ok());
    }

    #[tokio::test]
    async fn test_import_upserts_atomically() {
        let storage = InMemoryStorage::new();
        let mut service = service(&storage).await;

        let summary = service
            .import(vec![product("1", "9 ETH"), product("x", "1 ETH")])
            .await
            .unwrap();
        assert_eq!(summary, ImportSummary { added: 1, updated: 1 });
        assert_eq!(
            service.catalog().get("1").unwrap().price,
            Price::parse("9 ETH").unwrap()
        );

        let before = service.catalog().clone();
        let result = service
            .import(vec![product("y", "1 ETH"), product("z", "1 MATIC")])
            .await;
        assert!(matches!(result, Err(StorefrontError::UnitMismatch { .. })));
        assert_eq!(service.catalog(), &before);
    }
}
