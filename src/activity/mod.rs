// activity - append-only audit trail written off the request path

use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub user_id: Option<i64>,
    pub ip_address: String,
    pub action: String,
    pub context: Value,
}

/// Cheap handle that queues entries for the background writer
#[derive(Clone, Debug)]
pub struct ActivityLogger {
    sender: mpsc::UnboundedSender<ActivityEntry>,
}

impl ActivityLogger {
    /// Start the writer task on the current runtime
    pub fn spawn(pool: PgPool) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(pool, receiver));
        Self { sender }
    }

    pub fn from_sender(sender: mpsc::UnboundedSender<ActivityEntry>) -> Self {
        Self { sender }
    }

    /// Queue an entry. Never fails the caller.
    pub fn record(
        &self,
        user_id: Option<i64>,
        ip_address: &str,
        action: &str,
        context: Value,
    ) {
        let entry = ActivityEntry {
            user_id,
            ip_address: ip_address.to_string(),
            action: action.to_string(),
            context,
        };
        if let Err(e) = self.sender.send(entry) {
            warn!("Activity log writer is gone, dropping {}", e.0.action);
        }
    }
}

async fn run_writer(pool: PgPool, mut receiver: mpsc::UnboundedReceiver<ActivityEntry>) {
    while let Some(entry) = receiver.recv().await {
        let result = sqlx::query(
            "INSERT INTO activity_log (user_id, ip_address, action, context)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.user_id)
        .bind(&entry.ip_address)
        .bind(&entry.action)
        .bind(&entry.context)
        .execute(&pool)
        .await;

        match result {
            Ok(_) => debug!("Activity logged: {}", entry.action),
            Err(e) => warn!("Failed to write activity {}: {}", entry.action, e),
        }
    }
    debug!("Activity log writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn record_queues_entry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let logger = ActivityLogger::from_sender(tx);
        logger.record(Some(1), "127.0.0.1", "client_created", json!({"client_id": 9}));

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.user_id, Some(1));
        assert_eq!(entry.action, "client_created");
        assert_eq!(entry.context["client_id"], 9);
    }

    #[tokio::test]
    async fn record_survives_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let logger = ActivityLogger::from_sender(tx);
        logger.record(None, "127.0.0.1", "logout", json!({}));
    }
}
