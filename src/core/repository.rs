use async_trait::async_trait;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::gateway::GatewayPublisherVia;

// Repositories are stateless and run on whatever connection they are handed, either a plain
// pooled connection or the one owned by a unit of work.
#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity and return its generated id
    async fn create(&self, conn: &mut SqliteConnection, entity: &Entity) -> LibraryResult<i64>;

    // updates an entity
    async fn update(&self, conn: &mut SqliteConnection, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<usize>;

    // find by predicate, keys are `column` or `column:op`
    async fn query(&self, conn: &mut SqliteConnection, predicate: &HashMap::<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Entity>>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    Sqlite,
    Memory,
}

impl RepositoryStore {
    // LMS_STORE=memory selects a throwaway in-memory store
    pub fn from_env() -> Self {
        match std::env::var("LMS_STORE") {
            Ok(val) if val.eq_ignore_ascii_case("memory") => RepositoryStore::Memory,
            _ => RepositoryStore::Sqlite,
        }
    }

    pub fn gateway_publisher(&self) -> GatewayPublisherVia  {
        match self {
            RepositoryStore::Sqlite => {GatewayPublisherVia::Database},
            RepositoryStore::Memory => {GatewayPublisherVia::Logs},
        }
    }
}
