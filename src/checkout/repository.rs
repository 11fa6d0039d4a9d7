pub mod sql_checkout_repository;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqliteConnection;
use crate::checkout::domain::model::{CheckoutEntity, OverdueEntity};
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;


#[async_trait]
pub(crate) trait CheckoutRepository : Repository<CheckoutEntity> {
    // the outstanding loan of a book by a patron, if any
    async fn find_open(&self, conn: &mut SqliteConnection, patron_id: i64, book_id: i64) -> LibraryResult<Option<CheckoutEntity>>;

    async fn query_overdue(&self, conn: &mut SqliteConnection, as_of: NaiveDateTime) -> LibraryResult<Vec<OverdueEntity>>;
}
