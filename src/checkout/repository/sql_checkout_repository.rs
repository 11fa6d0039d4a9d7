use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::checkout::domain::model::{CheckoutEntity, OverdueEntity};
use crate::checkout::repository::CheckoutRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::core::store::{push_page, push_predicate, to_page};

const CHECKOUT_FILTERS: [&str; 6] = ["id", "user_id", "book_id", "borrow_date", "due_date", "return_date"];

#[derive(Debug, Default)]
pub struct SqlCheckoutRepository {}

impl SqlCheckoutRepository {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Repository<CheckoutEntity> for SqlCheckoutRepository {
    async fn create(&self, conn: &mut SqliteConnection, entity: &CheckoutEntity) -> LibraryResult<i64> {
        sqlx::query("INSERT INTO borrowers (user_id, book_id, borrow_date, due_date, return_date) VALUES (?, ?, ?, ?, ?)")
            .bind(entity.patron_id)
            .bind(entity.book_id)
            .bind(entity.borrow_date)
            .bind(entity.due_date)
            .bind(entity.return_date)
            .execute(conn)
            .await.map(|res| res.last_insert_rowid()).map_err(LibraryError::from)
    }

    // Only the return date of a loan ever changes.
    async fn update(&self, conn: &mut SqliteConnection, entity: &CheckoutEntity) -> LibraryResult<usize> {
        let updated = sqlx::query("UPDATE borrowers SET return_date = ? WHERE id = ?")
            .bind(entity.return_date)
            .bind(entity.checkout_id)
            .execute(conn)
            .await?
            .rows_affected() as usize;
        if updated == 0 {
            return Err(LibraryError::loan_not_found("Borrow record not found"));
        }
        Ok(updated)
    }

    async fn get(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<CheckoutEntity> {
        sqlx::query_as::<_, CheckoutEntity>("SELECT * FROM borrowers WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| LibraryError::loan_not_found("Borrow record not found"))
    }

    async fn delete(&self, _conn: &mut SqliteConnection, id: i64) -> LibraryResult<usize> {
        // the ledger is append-only
        Err(LibraryError::validation(
            format!("borrow record {} cannot be deleted", id).as_str(), None))
    }

    async fn query(&self, conn: &mut SqliteConnection, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutEntity>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM borrowers WHERE 1 = 1");
        push_predicate(&mut builder, predicate, &CHECKOUT_FILTERS)?;
        builder.push(" ORDER BY id");
        let (offset, limit) = push_page(&mut builder, page, page_size)?;
        let records = builder.build_query_as::<CheckoutEntity>()
            .fetch_all(conn)
            .await?;
        Ok(to_page(page, offset, limit, records))
    }
}

#[async_trait]
impl CheckoutRepository for SqlCheckoutRepository {
    async fn find_open(&self, conn: &mut SqliteConnection, patron_id: i64, book_id: i64) -> LibraryResult<Option<CheckoutEntity>> {
        sqlx::query_as::<_, CheckoutEntity>(
            "SELECT * FROM borrowers WHERE user_id = ? AND book_id = ? AND return_date IS NULL")
            .bind(patron_id)
            .bind(book_id)
            .fetch_optional(conn)
            .await.map_err(LibraryError::from)
    }

    async fn query_overdue(&self, conn: &mut SqliteConnection, as_of: NaiveDateTime) -> LibraryResult<Vec<OverdueEntity>> {
        sqlx::query_as::<_, OverdueEntity>(
            "SELECT b.id AS book_id, b.title, b.author, l.borrow_date, l.due_date, \
                    l.id AS checkout_id, l.user_id AS patron_id \
             FROM borrowers l JOIN books b ON b.id = l.book_id \
             WHERE l.return_date IS NULL AND l.due_date < ? \
             ORDER BY l.due_date, l.id")
            .bind(as_of)
            .fetch_all(conn)
            .await.map_err(LibraryError::from)
    }
}
