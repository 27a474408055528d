use crate::config::SimulationConfig;
use crate::domain::ports::{
    PaymentGateway, PaymentOutcome, PaymentReceipt, PaymentRequest, WalletConnector,
};
use crate::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Reference handed out for every accepted simulated payment.
pub const SIMULATED_TRANSACTION_REF: &str = "0x1234567890abcdef1234567890abcdef12345678";
/// Message of a simulated rejection.
pub const SIMULATED_REJECTION: &str = "Transaction failed. Please try again.";

/// Stand-in gateway: waits a fixed delay, then accepts or rejects at random.
pub struct SimulatedGateway {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn submit(&self, request: &PaymentRequest) -> Result<PaymentOutcome> {
        debug!(payer = %request.payer, total = %request.total, lines = request.lines.len(), "Submitting simulated payment");
        tokio::time::sleep(self.config.payment_delay).await;

        let draw: f64 = self.rng.lock().await.r#gen();
        if draw < self.config.failure_probability {
            return Ok(PaymentOutcome::Rejected {
                reason: SIMULATED_REJECTION.to_string(),
            });
        }
        Ok(PaymentOutcome::Accepted(PaymentReceipt {
            transaction_ref: SIMULATED_TRANSACTION_REF.to_string(),
        }))
    }
}

/// Connector for hosts without a wallet provider: it only records the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingWalletConnector;

impl WalletConnector for LoggingWalletConnector {
    fn request_connection(&self) {
        info!("Wallet connection requested");
    }
}
