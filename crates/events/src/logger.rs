//! Background subscriber that writes every platform event to the trace log.

use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Traces each event received from the bus.
pub struct EventLogger;

impl EventLogger {
    /// Run until the bus is dropped. Returns the number of events logged.
    pub async fn run(mut receiver: broadcast::Receiver<PlatformEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event_type = %event.event_type,
                        entity_type = event.entity_type.as_deref().unwrap_or("-"),
                        entity_id = ?event.entity_id,
                        actor_user_id = ?event.actor_user_id,
                        payload = %event.payload,
                        "Platform event"
                    );
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
        logged
    }
}
