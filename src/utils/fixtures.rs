use chrono::{Duration, Utc};
use crate::books::domain::model::BookEntity;
use crate::books::factory::create_book_repository;
use crate::checkout::domain::model::CheckoutEntity;
use crate::checkout::factory::create_checkout_repository;
use crate::core::library::Role;
use crate::core::repository::Repository;
use crate::core::store::Store;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::factory::create_patron_repository;

pub(crate) async fn add_patron(store: &Store, username: &str) -> i64 {
    let mut conn = store.acquire().await.expect("should acquire");
    create_patron_repository().create(&mut conn, &PatronEntity::new(username, Role::Member))
        .await.expect("should add patron")
}

pub(crate) async fn add_book(store: &Store, isbn: &str, quantity: i64) -> BookEntity {
    let mut conn = store.acquire().await.expect("should acquire");
    let repo = create_book_repository();
    let title = format!("title of {}", isbn);
    let id = repo.create(&mut conn, &BookEntity::new(isbn, title.as_str(), "author", 2000, quantity))
        .await.expect("should add book");
    repo.get(&mut conn, id).await.expect("should load book")
}

pub(crate) async fn get_book(store: &Store, book_id: i64) -> BookEntity {
    let mut conn = store.acquire().await.expect("should acquire");
    create_book_repository().get(&mut conn, book_id).await.expect("should load book")
}

// Writes a bare loan row due `due_in_days` from now, leaving the book's quantity untouched.
pub(crate) async fn add_loan(store: &Store, patron_id: i64, book_id: i64, due_in_days: i64) -> CheckoutEntity {
    let mut conn = store.acquire().await.expect("should acquire");
    let repo = create_checkout_repository();
    let mut loan = CheckoutEntity::new(patron_id, book_id, Utc::now().naive_utc() + Duration::days(due_in_days));
    loan.borrow_date = loan.due_date - Duration::days(15);
    loan.checkout_id = repo.create(&mut conn, &loan).await.expect("should add loan");
    loan
}

pub(crate) async fn count_open_loans(store: &Store, book_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM borrowers WHERE book_id = ? AND return_date IS NULL")
        .bind(book_id)
        .fetch_one(store.pool()).await.expect("should count loans")
}
