//! Typed runtime settings for the ledger, the checkout sequencer, and the
//! simulated payment gateway.
//!
//! The CLI fills these from flags and environment variables; library users
//! build them directly or start from `Default`.

use crate::error::{Result, StorefrontError};
use std::time::Duration;

/// Default currency unit label.
pub const DEFAULT_UNIT: &str = "ETH";
/// Default local storage key for the cart blob.
pub const DEFAULT_CART_KEY: &str = "cart-storage";
/// Local storage key for the merchant catalog.
pub const CATALOG_KEY: &str = "merchant-catalog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Unit label appended to totals.
    pub unit: String,
    /// Local storage key the cart blob lives under.
    pub storage_key: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            unit: DEFAULT_UNIT.to_string(),
            storage_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.unit.is_empty() || self.unit.chars().any(char::is_whitespace) {
            return Err(StorefrontError::InvalidConfig(format!(
                "Unit label {:?} must be a single non-empty word",
                self.unit
            )));
        }
        if self.storage_key.is_empty() {
            return Err(StorefrontError::InvalidConfig(
                "Cart storage key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Time between two progress ticks while processing.
    pub tick_interval: Duration,
    /// Progress added per tick.
    pub progress_step: u8,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            progress_step: 10,
        }
    }
}

impl CheckoutConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(StorefrontError::InvalidConfig(
                "Tick interval must be greater than zero".to_string(),
            ));
        }
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(StorefrontError::InvalidConfig(format!(
                "Progress step must be within 1..=100, got {}",
                self.progress_step
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Delay before the simulated gateway answers.
    pub payment_delay: Duration,
    /// Chance of a simulated rejection, within `0.0..=1.0`.
    pub failure_probability: f64,
    /// Fixed RNG seed for reproducible outcomes.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            payment_delay: Duration::from_secs(1),
            failure_probability: 0.1,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(StorefrontError::InvalidConfig(format!(
                "Failure probability must be within 0.0..=1.0, got {}",
                self.failure_probability
            )));
        }
        Ok(())
    }
}
