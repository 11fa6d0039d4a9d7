pub mod sql_patron_repository;

use async_trait::async_trait;
use sqlx::SqliteConnection;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;

#[async_trait]
pub(crate) trait PatronRepository: Repository<PatronEntity> {
    async fn find_by_username(&self, conn: &mut SqliteConnection, username: &str) -> LibraryResult<Option<PatronEntity>>;
}
