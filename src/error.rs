use crate::domain::checkout::CheckoutPhase;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    StorageError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Invalid price: {input:?}")]
    InvalidPrice { input: String },
    #[error("Price unit mismatch: expected {expected}, found {found}")]
    UnitMismatch { expected: String, found: String },
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("Duplicate product: {0}")]
    DuplicateProduct(String),
    #[error("Product is not available for purchase: {0}")]
    InactiveProduct(String),
    #[error("Quantity out of range: {quantity}")]
    InvalidQuantity { quantity: i64 },
    #[error("Cart total would exceed the supported range")]
    TotalOverflow,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Cannot {action} while checkout is in the {phase} phase")]
    InvalidTransition {
        phase: CheckoutPhase,
        action: &'static str,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for StorefrontError {
    fn from(e: rocksdb::Error) -> Self {
        StorefrontError::StorageError(Box::new(e))
    }
}
