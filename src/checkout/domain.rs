use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::checkout::dto::{CheckoutReceipt, OverdueDto};
use crate::core::library::LibraryResult;

pub mod model;
pub mod service;

// CheckoutService is the only place that changes a book's quantity together with its loans.
#[async_trait]
pub(crate) trait CheckoutService: Sync + Send {
    // Lends one copy of the book. Without a due date the loan runs for the configured loan days.
    async fn checkout(&self, patron_id: i64, book_id: i64,
                      due_date: Option<NaiveDateTime>) -> LibraryResult<CheckoutReceipt>;

    // Closes the patron's outstanding loan of the book and puts the copy back.
    async fn returned(&self, patron_id: i64, book_id: i64) -> LibraryResult<CheckoutReceipt>;

    // Outstanding loans due before `as_of`, earliest due first.
    async fn list_overdue(&self, as_of: NaiveDateTime) -> LibraryResult<Vec<OverdueDto>>;
}
