pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::patrons::dto::PatronDto;

#[async_trait]
pub(crate) trait PatronService: Sync + Send {
    // registers a borrower and returns it with its generated id
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto>;
    async fn find_patron_by_id(&self, id: i64) -> LibraryResult<PatronDto>;
    async fn find_patron_by_username(&self, username: &str) -> LibraryResult<Option<PatronDto>>;
}
