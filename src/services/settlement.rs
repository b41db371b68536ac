use async_trait::async_trait;

use crate::models::payments;

/// Error from the payment processor side of a settlement.
#[derive(Debug)]
pub struct SettlementError(pub String);

impl std::fmt::Display for SettlementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SettlementError {}

/// Seam between the ledger state machine and a payment processor.
///
/// The engine drives every payment through authorize → capture and records
/// the outcome; it never assumes which gateway sits behind this trait. A
/// future asynchronous processor implements the same two calls and uses
/// the transaction `reference_id` to deduplicate retried callbacks.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Reserve the funds for a pending payment.
    async fn authorize(&self, payment: &payments::Model) -> Result<(), SettlementError>;

    /// Capture previously authorized funds.
    async fn capture(&self, payment: &payments::Model) -> Result<(), SettlementError>;
}

/// Wrapper type for Actix-web app data.
pub type SettlementData = std::sync::Arc<dyn SettlementGateway>;

/// The simulated processor: settlement always succeeds, synchronously.
pub struct InstantSettlement;

#[async_trait]
impl SettlementGateway for InstantSettlement {
    async fn authorize(&self, _payment: &payments::Model) -> Result<(), SettlementError> {
        Ok(())
    }

    async fn capture(&self, _payment: &payments::Model) -> Result<(), SettlementError> {
        Ok(())
    }
}
