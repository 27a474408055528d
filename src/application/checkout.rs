use super::ledger::SharedLedger;
use crate::config::CheckoutConfig;
use crate::domain::cart::CartLine;
use crate::domain::checkout::{CheckoutPhase, CheckoutSession};
use crate::domain::ports::{
    PaymentGatewayBox, PaymentOutcome, PaymentRequest, WalletConnectorBox, WalletIdentity,
};
use crate::error::{Result, StorefrontError};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// What a call to [`CheckoutSequencer::pay`] led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayOutcome {
    /// No wallet was connected; the connection flow was requested and the
    /// session is still in review.
    WalletRequired,
    /// The gateway declined; the session is in the error phase.
    Rejected { reason: String },
    /// The gateway accepted; progress is ticking towards success.
    Processing,
}

/// Result of a finished checkout, handed back once the cart is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedOrder {
    pub transaction_ref: String,
    pub lines: Vec<CartLine>,
    pub total: String,
}

/// Drives one [`CheckoutSession`] from review to success.
///
/// The session is published through a `watch` channel so views can follow the
/// phase and progress. While processing, a background task advances progress
/// on a fixed interval; the task is aborted when the sequencer is cancelled or
/// dropped, so nothing touches a discarded session.
pub struct CheckoutSequencer {
    ledger: SharedLedger,
    gateway: PaymentGatewayBox,
    connector: WalletConnectorBox,
    config: CheckoutConfig,
    state: Arc<watch::Sender<CheckoutSession>>,
    ticker: Option<JoinHandle<()>>,
    completed: bool,
}

impl CheckoutSequencer {
    /// Opens a checkout over a snapshot of the ledger.
    ///
    /// Fails with [`StorefrontError::EmptyCart`] before any payment phase when
    /// the cart has no lines.
    pub async fn begin(
        ledger: SharedLedger,
        gateway: PaymentGatewayBox,
        connector: WalletConnectorBox,
        config: CheckoutConfig,
    ) -> Result<Self> {
        config.validate()?;
        let session = {
            let ledger = ledger.lock().await;
            CheckoutSession::new(ledger.cart(), ledger.unit())?
        };
        info!(total = %session.total, lines = session.lines.len(), "Checkout started");

        let (state, _) = watch::channel(session);
        Ok(Self {
            ledger,
            gateway,
            connector,
            config,
            state: Arc::new(state),
            ticker: None,
            completed: false,
        })
    }

    /// Current session state.
    pub fn session(&self) -> CheckoutSession {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.state.borrow().phase
    }

    /// Follows every phase and progress change.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutSession> {
        self.state.subscribe()
    }

    /// Submits the snapshot for payment.
    ///
    /// Without a wallet, the connector is asked to start its flow and the
    /// session stays in review. Otherwise the session moves to payment and then
    /// to processing or error depending on the gateway's answer. A gateway
    /// failure is surfaced as a rejection so the user can retry.
    pub async fn pay(&mut self, wallet: Option<&WalletIdentity>) -> Result<PayOutcome> {
        let phase = self.phase();
        if phase != CheckoutPhase::Review {
            return Err(StorefrontError::InvalidTransition {
                phase,
                action: "start payment",
            });
        }

        let Some(wallet) = wallet else {
            info!("Checkout needs a connected wallet");
            self.connector.request_connection();
            return Ok(PayOutcome::WalletRequired);
        };

        self.transition(CheckoutSession::start_payment)?;
        info!(payer = %wallet.short_address(), "Preparing payment");

        let request = {
            let session = self.state.borrow();
            PaymentRequest {
                payer: wallet.address.clone(),
                lines: session.lines.clone(),
                total: session.total.clone(),
            }
        };

        let outcome = match self.gateway.submit(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Payment gateway failed");
                PaymentOutcome::Rejected {
                    reason: e.to_string(),
                }
            }
        };

        match outcome {
            PaymentOutcome::Rejected { reason } => {
                let message = reason.clone();
                self.transition(move |session| session.reject(message))?;
                warn!(%reason, "Payment rejected");
                Ok(PayOutcome::Rejected { reason })
            }
            PaymentOutcome::Accepted(receipt) => {
                self.transition(CheckoutSession::accept)?;
                info!("Transaction submitted, processing");
                self.spawn_ticker(receipt.transaction_ref);
                Ok(PayOutcome::Processing)
            }
        }
    }

    /// Waits until the session leaves processing and returns it.
    ///
    /// Returns immediately in any other phase.
    pub async fn wait_for_settled(&self) -> CheckoutSession {
        let mut receiver = self.state.subscribe();
        let settled = receiver
            .wait_for(|session| session.phase != CheckoutPhase::Processing)
            .await
            .map(|session| session.clone());
        settled.unwrap_or_else(|_| self.session())
    }

    /// Goes back to review after a rejection, clearing the error and progress.
    pub fn retry(&mut self) -> Result<()> {
        self.transition(CheckoutSession::retry)?;
        info!("Checkout reset for retry");
        Ok(())
    }

    /// Finishes a successful checkout: clears the ledger and returns the order.
    ///
    /// Only allowed once, in the success phase.
    pub async fn complete(&mut self) -> Result<CompletedOrder> {
        let session = self.session();
        let transaction_ref = match (&session.transaction_ref, self.completed) {
            (Some(reference), false) if session.phase == CheckoutPhase::Success => {
                reference.clone()
            }
            _ => {
                return Err(StorefrontError::InvalidTransition {
                    phase: session.phase,
                    action: "complete",
                });
            }
        };

        self.ledger.lock().await.clear().await;
        self.completed = true;
        info!(%transaction_ref, "Order completed");

        Ok(CompletedOrder {
            transaction_ref,
            lines: session.lines,
            total: session.total,
        })
    }

    /// Tears the checkout down, stopping the progress task if it runs.
    pub fn cancel(mut self) -> CheckoutSession {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            info!("Checkout cancelled while processing");
        }
        self.session()
    }

    fn transition<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut CheckoutSession) -> Result<()>,
    {
        let mut result = Ok(());
        self.state.send_if_modified(|session| {
            result = apply(session);
            result.is_ok()
        });
        result
    }

    fn spawn_ticker(&mut self, transaction_ref: String) {
        let state = Arc::clone(&self.state);
        let period = self.config.tick_interval;
        let step = self.config.progress_step;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut finished = false;
                let advanced = state.send_if_modified(|session| {
                    match session.advance(step, &transaction_ref) {
                        Ok(done) => {
                            finished = done;
                            true
                        }
                        Err(_) => false,
                    }
                });
                if finished {
                    info!(%transaction_ref, "Payment successful");
                    break;
                }
                if !advanced {
                    break;
                }
            }
        });

        if let Some(previous) = self.ticker.replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for CheckoutSequencer {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
