use async_trait::async_trait;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;

// Events are published after the unit of work that produced them has committed.
#[async_trait]
pub(crate) trait EventPublisher: Sync + Send {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError>;
}

// The change is already committed when this runs, so failures are only logged.
pub(crate) async fn publish_committed(publisher: &dyn EventPublisher, event: serde_json::Result<DomainEvent>) {
    match event {
        Ok(event) => {
            if let Err(err) = publisher.publish(&event).await {
                tracing::warn!(error = %err, name = event.name.as_str(), key = event.key.as_str(),
                    "failed to publish domain event");
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize domain event");
        }
    }
}
