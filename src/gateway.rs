pub mod events;
pub mod factory;
pub mod logs;
pub mod sql;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GatewayPublisherVia {
    Logs,
    Database,
}
