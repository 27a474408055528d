use super::cart::CartLine;
use crate::error::Result;
use async_trait::async_trait;

/// Key-value blob storage scoped to one browser-like session.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub type LocalStorageBox = Box<dyn LocalStorage>;

/// What the checkout hands to a gateway: the payer and the cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub payer: String,
    pub lines: Vec<CartLine>,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub transaction_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Accepted(PaymentReceipt),
    /// A user-facing, retryable rejection.
    Rejected { reason: String },
}

/// Submits a checkout to whatever settles it.
///
/// `Err` is reserved for the gateway itself failing; a declined payment is
/// `Ok(PaymentOutcome::Rejected { .. })`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit(&self, request: &PaymentRequest) -> Result<PaymentOutcome>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;

/// The connected wallet, as reported by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletIdentity {
    pub address: String,
}

impl WalletIdentity {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// `0x1234...abcd` style rendering for display.
    pub fn short_address(&self) -> String {
        let chars: Vec<char> = self.address.chars().collect();
        if chars.len() <= 10 {
            return self.address.clone();
        }
        let head: String = chars.iter().take(6).collect();
        let tail: String = chars.iter().skip(chars.len() - 4).collect();
        format!("{head}...{tail}")
    }
}

/// Starts the wallet provider's own connection flow.
pub trait WalletConnector: Send + Sync {
    fn request_connection(&self);
}

pub type WalletConnectorBox = Box<dyn WalletConnector>;
