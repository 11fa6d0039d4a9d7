use async_trait::async_trait;
use sqlx::SqlitePool;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// SqlEventPublisher appends events to the `events` table of the library store.
#[derive(Debug)]
pub struct SqlEventPublisher {
    pool: SqlitePool,
}

impl SqlEventPublisher {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventPublisher for SqlEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let metadata = serde_json::to_string(&event.metadata)?;
        sqlx::query("INSERT INTO events (event_id, name, event_group, event_key, kind, metadata, json_data, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(event.event_id.as_str())
            .bind(event.name.as_str())
            .bind(event.group.as_str())
            .bind(event.key.as_str())
            .bind(event.kind.to_string())
            .bind(metadata)
            .bind(event.json_data.as_str())
            .bind(event.created_at)
            .execute(&self.pool)
            .await.map(|_| ()).map_err(LibraryError::from)
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::DomainEvent;
    use crate::core::store::build_test_store;
    use crate::gateway::events::EventPublisher;
    use crate::gateway::sql::publisher::SqlEventPublisher;

    #[tokio::test]
    async fn test_should_publish_to_store() {
        let (_dir, store) = build_test_store().await;
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::added("test-name", "group", "key", &HashMap::from([("k".to_string(), "v".to_string())]), &data).expect("build event");
        let publisher = SqlEventPublisher::new(store.pool().clone());
        publisher.publish(&event).await.expect("should publish");

        let (name, kind, metadata): (String, String, String) = sqlx::query_as(
            "SELECT name, kind, metadata FROM events WHERE event_id = ?")
            .bind(event.event_id.as_str())
            .fetch_one(store.pool()).await.expect("should find event");
        assert_eq!("test-name", name.as_str());
        assert_eq!("Added", kind.as_str());
        assert_eq!(r#"{"k":"v"}"#, metadata.as_str());

        // event ids are unique
        assert!(publisher.publish(&event).await.is_err());
    }
}
