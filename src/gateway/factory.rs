use crate::core::store::Store;
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::logs::LogEventPublisher;
use crate::gateway::sql::publisher::SqlEventPublisher;

pub(crate) fn create_publisher(via: GatewayPublisherVia, store: &Store) -> Box<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Logs => {
            Box::new(LogEventPublisher::new())
        }
        GatewayPublisherVia::Database => {
            Box::new(SqlEventPublisher::new(store.pool().clone()))
        }
    }
}
