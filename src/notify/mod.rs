use redis::{Client, RedisError, aio::ConnectionManager};
use serde_json::json;
use uuid::Uuid;

/// Best-effort notification dispatcher.
///
/// Events are published to per-user Redis pub/sub channels on a spawned
/// task; a failed publish is logged and dropped. Callers invoke this only
/// after their financial transaction has committed, and no caller treats
/// delivery failure as an error.
#[derive(Clone)]
pub struct Notifier {
    connection: Option<ConnectionManager>,
}

impl Notifier {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self {
            connection: Some(connection),
        })
    }

    /// A notifier with no transport; events are logged and dropped.
    /// Used in tests and local runs without Redis.
    pub fn disconnected() -> Self {
        Self { connection: None }
    }

    /// Fire-and-forget delivery of a user-facing event.
    pub fn notify(
        &self,
        user_id: Uuid,
        kind: &str,
        message: &str,
        link_url: Option<String>,
        data: serde_json::Value,
    ) {
        let payload = json!({
            "user_id": user_id,
            "type": kind,
            "message": message,
            "link_url": link_url,
            "data": data,
        })
        .to_string();

        let Some(connection) = self.connection.clone() else {
            tracing::debug!(%user_id, kind, "notification dropped (no transport)");
            return;
        };

        let channel = channels::user(user_id);
        tokio::spawn(async move {
            let result: Result<(), RedisError> = redis::cmd("PUBLISH")
                .arg(&channel)
                .arg(&payload)
                .query_async(&mut connection.clone())
                .await;
            if let Err(e) = result {
                tracing::warn!("failed to deliver notification on {channel}: {e}");
            }
        });
    }
}

/// Channel name builders.
pub mod channels {
    use uuid::Uuid;

    pub fn user(user_id: Uuid) -> String {
        format!("notifications:{user_id}")
    }
}

/// Event kind strings shared with the delivery side.
pub mod kinds {
    pub const CONTRACT_CREATED: &str = "contract_created";
    pub const CONTRACT_PENDING: &str = "contract_pending";
    pub const CONTRACT_SIGNED: &str = "contract_signed";
    pub const CONTRACT_ACTIVATED: &str = "contract_activated";
    pub const CONTRACT_CANCELLED: &str = "contract_cancelled";
    pub const CONTRACT_COMPLETED: &str = "contract_completed";
    pub const MILESTONE_FUNDED: &str = "milestone_funded";
    pub const MILESTONE_SUBMITTED: &str = "milestone_submitted";
    pub const MILESTONE_APPROVED: &str = "milestone_approved";
    pub const MILESTONE_REJECTED: &str = "milestone_rejected";
    pub const PAYMENT_RELEASED: &str = "payment_released";
    pub const PAYMENT_RECEIVED: &str = "payment_received";
    pub const PAYMENT_REFUNDED: &str = "payment_refunded";
    pub const TIME_LOG_CREATED: &str = "time_log_created";
    pub const TIME_LOG_REVIEWED: &str = "time_log_reviewed";
}
