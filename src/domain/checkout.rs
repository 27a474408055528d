use super::cart::{Cart, CartLine};
use crate::error::{Result, StorefrontError};
use serde::Serialize;
use std::fmt;

/// Upper bound of the processing progress indicator.
pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutPhase {
    Review,
    Payment,
    Processing,
    Success,
    Error,
}

impl CheckoutPhase {
    /// Position in the visible `review → payment → processing → success` track.
    /// `Error` is off-track.
    pub fn step_index(self) -> Option<usize> {
        match self {
            CheckoutPhase::Review => Some(0),
            CheckoutPhase::Payment => Some(1),
            CheckoutPhase::Processing => Some(2),
            CheckoutPhase::Success => Some(3),
            CheckoutPhase::Error => None,
        }
    }

    /// `Success` and `Error` wait for user action; nothing advances them.
    pub fn is_settled(self) -> bool {
        matches!(self, CheckoutPhase::Success | CheckoutPhase::Error)
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutPhase::Review => "review",
            CheckoutPhase::Payment => "payment",
            CheckoutPhase::Processing => "processing",
            CheckoutPhase::Success => "success",
            CheckoutPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// State of one checkout attempt.
///
/// The transition methods only move between phases; timers and the payment
/// gateway live in [`crate::application::checkout::CheckoutSequencer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSession {
    pub phase: CheckoutPhase,
    /// Cart contents captured when the session was created.
    pub lines: Vec<CartLine>,
    /// Formatted total captured when the session was created.
    pub total: String,
    pub transaction_ref: Option<String>,
    pub error: Option<String>,
    pub progress: u8,
}

impl CheckoutSession {
    /// Snapshots `cart`. An empty cart cannot be checked out.
    pub fn new(cart: &Cart, unit: &str) -> Result<Self> {
        if cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        Ok(Self {
            phase: CheckoutPhase::Review,
            lines: cart.lines().to_vec(),
            total: cart.aggregate(unit).total,
            transaction_ref: None,
            error: None,
            progress: 0,
        })
    }

    pub fn start_payment(&mut self) -> Result<()> {
        self.expect_phase(CheckoutPhase::Review, "start payment")?;
        self.phase = CheckoutPhase::Payment;
        Ok(())
    }

    /// Payment rejected: progress is left as it was.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<()> {
        self.expect_phase(CheckoutPhase::Payment, "reject payment")?;
        self.error = Some(reason.into());
        self.phase = CheckoutPhase::Error;
        Ok(())
    }

    pub fn accept(&mut self) -> Result<()> {
        self.expect_phase(CheckoutPhase::Payment, "accept payment")?;
        self.progress = 0;
        self.phase = CheckoutPhase::Processing;
        Ok(())
    }

    /// Moves progress forward by `step` (at least 1). Reaching 100 records
    /// `transaction_ref` and finishes the session. Returns `true` once done.
    pub fn advance(&mut self, step: u8, transaction_ref: &str) -> Result<bool> {
        self.expect_phase(CheckoutPhase::Processing, "advance progress")?;
        self.progress = self
            .progress
            .saturating_add(step.max(1))
            .min(PROGRESS_COMPLETE);
        if self.progress == PROGRESS_COMPLETE {
            self.transaction_ref = Some(transaction_ref.to_string());
            self.phase = CheckoutPhase::Success;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn retry(&mut self) -> Result<()> {
        self.expect_phase(CheckoutPhase::Error, "retry")?;
        self.error = None;
        self.progress = 0;
        self.phase = CheckoutPhase::Review;
        Ok(())
    }

    fn expect_phase(&self, expected: CheckoutPhase, action: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(StorefrontError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }
}
