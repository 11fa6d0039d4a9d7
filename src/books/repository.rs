pub mod sql_book_repository;

use async_trait::async_trait;
use sqlx::SqliteConnection;
use crate::books::domain::model::BookEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;


#[async_trait]
pub(crate) trait BookRepository: Repository<BookEntity> {
    async fn find_by_isbn(&self, conn: &mut SqliteConnection, isbn: &str) -> LibraryResult<Option<BookEntity>>;
}
