use crate::config::LedgerConfig;
use crate::domain::cart::{Cart, CartAggregate, CartItem, CartLine, PersistedCart};
use crate::domain::ports::LocalStorageBox;
use crate::error::{Result, StorefrontError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Ledger handle shared between the storefront and a checkout.
pub type SharedLedger = Arc<Mutex<CartLedger>>;

/// The authoritative cart of one session.
///
/// `CartLedger` owns the lines, the panel visibility flag, and the storage the
/// cart is persisted to. Every mutation rewrites the whole blob under the
/// configured key; a failed write is logged and the in-memory state stays
/// authoritative.
pub struct CartLedger {
    cart: Cart,
    is_open: bool,
    config: LedgerConfig,
    storage: LocalStorageBox,
}

impl CartLedger {
    /// Creates an empty ledger without reading storage.
    pub fn new(storage: LocalStorageBox, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cart: Cart::new(),
            is_open: false,
            config,
            storage,
        })
    }

    /// Rehydrates the ledger from storage.
    ///
    /// Derived fields in the blob are ignored and recomputed from the lines.
    /// Lines priced in another unit than the ledger's are dropped. A blob that
    /// cannot be decoded is discarded and the ledger starts empty.
    pub async fn load(storage: LocalStorageBox, config: LedgerConfig) -> Result<Self> {
        let mut ledger = Self::new(storage, config)?;
        let Some(bytes) = ledger.storage.get(&ledger.config.storage_key).await? else {
            debug!(key = %ledger.config.storage_key, "No persisted cart, starting empty");
            return Ok(ledger);
        };

        match serde_json::from_slice::<PersistedCart>(&bytes) {
            Ok(persisted) => {
                let restored = persisted.into_cart(&ledger.config.unit);
                for line in &restored.discarded {
                    warn!(
                        id = %line.id(),
                        price = %line.item.price,
                        unit = %ledger.config.unit,
                        "Dropping persisted cart line that does not fit this ledger"
                    );
                }
                if restored.drifted {
                    warn!(
                        key = %ledger.config.storage_key,
                        "Persisted cart totals disagree with its lines, using recomputed values"
                    );
                }
                ledger.cart = restored.cart;
                ledger.is_open = restored.is_open;
            }
            Err(e) => {
                warn!(key = %ledger.config.storage_key, error = %e, "Discarding unreadable persisted cart");
            }
        }
        Ok(ledger)
    }

    pub fn into_shared(self) -> SharedLedger {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn unit(&self) -> &str {
        &self.config.unit
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn aggregate(&self) -> CartAggregate {
        self.cart.aggregate(&self.config.unit)
    }

    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    pub fn total(&self) -> String {
        self.aggregate().total
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Adds one unit of `item`.
    pub async fn add_item(&mut self, item: CartItem) -> Result<()> {
        self.add_item_with_quantity(item, 1).await
    }

    /// Adds `quantity` units of `item`; zero is a no-op.
    ///
    /// The item must be priced in the ledger's unit.
    pub async fn add_item_with_quantity(&mut self, item: CartItem, quantity: u32) -> Result<()> {
        if item.price.unit() != self.config.unit {
            return Err(StorefrontError::UnitMismatch {
                expected: self.config.unit.clone(),
                found: item.price.unit().to_string(),
            });
        }
        if quantity == 0 {
            return Ok(());
        }
        debug!(id = %item.id, quantity, "Adding to cart");
        self.cart.add(item, quantity)?;
        self.persist().await;
        Ok(())
    }

    pub async fn remove_item(&mut self, id: &str) {
        if self.cart.remove(id).is_some() {
            debug!(id, "Removed from cart");
            self.persist().await;
        }
    }

    /// Sets a line's quantity outright. Zero or below removes the line; an
    /// unknown id changes nothing.
    pub async fn update_quantity(&mut self, id: &str, quantity: i64) -> Result<()> {
        if self.cart.set_quantity(id, quantity)? {
            debug!(id, quantity, "Updated cart quantity");
            self.persist().await;
        }
        Ok(())
    }

    pub async fn clear(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    pub async fn open(&mut self) {
        self.is_open = true;
        self.persist().await;
    }

    pub async fn close(&mut self) {
        self.is_open = false;
        self.persist().await;
    }

    pub async fn toggle(&mut self) {
        self.is_open = !self.is_open;
        self.persist().await;
    }

    /// Writes the blob, logging instead of failing.
    async fn persist(&self) {
        if let Err(e) = self.try_persist().await {
            warn!(key = %self.config.storage_key, error = %e, "Failed to persist cart");
        }
    }

    /// Writes the blob and reports failures to the caller.
    pub async fn try_persist(&self) -> Result<()> {
        let blob = PersistedCart::new(&self.cart, self.is_open, &self.config.unit);
        let bytes = serde_json::to_vec(&blob)?;
        self.storage.set(&self.config.storage_key, bytes).await
    }
}
