use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::checkout::domain::CheckoutService;
use crate::checkout::domain::model::CheckoutEntity;
use crate::checkout::dto::{CheckoutDto, CheckoutReceipt, OverdueDto};
use crate::checkout::repository::CheckoutRepository;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::core::store::{Store, UnitOfWork};
use crate::gateway::events::{EventPublisher, publish_committed};

const CHECKOUT_EVENTS: &str = "checkout";
const BOOK_NOT_AVAILABLE: &str = "Book not available";
const ALREADY_BORROWED: &str = "You have already borrowed this book";
const LOAN_NOT_FOUND: &str = "Borrow record not found";

pub(crate) struct CheckoutServiceImpl {
    branch_id: String,
    book_loan_days: i64,
    store: Store,
    book_repository: Box<dyn BookRepository>,
    checkout_repository: Box<dyn CheckoutRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CheckoutServiceImpl {
    pub(crate) fn new(config: &Configuration, store: Store, book_repository: Box<dyn BookRepository>,
                      checkout_repository: Box<dyn CheckoutRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            book_loan_days: config.book_loan_days,
            store,
            book_repository,
            checkout_repository,
            events_publisher,
        }
    }

    async fn borrow_in(&self, uow: &mut UnitOfWork, patron_id: i64, book_id: i64,
                       due_date: NaiveDateTime) -> LibraryResult<(BookEntity, CheckoutEntity)> {
        let conn = uow.conn()?;
        let mut book = self.book_repository.get(&mut *conn, book_id).await?;
        if !book.is_lendable() {
            return Err(LibraryError::unavailable(BOOK_NOT_AVAILABLE));
        }
        if self.checkout_repository.find_open(&mut *conn, patron_id, book_id).await?.is_some() {
            return Err(LibraryError::duplicate_loan(ALREADY_BORROWED));
        }
        let mut checkout = CheckoutEntity::new(patron_id, book_id, due_date);
        checkout.checkout_id = self.checkout_repository.create(&mut *conn, &checkout).await
            .map_err(|err| match err {
                LibraryError::DuplicateKey { .. } => LibraryError::duplicate_loan(ALREADY_BORROWED),
                other => other,
            })?;
        book.lend_copy();
        self.book_repository.update(&mut *conn, &book).await?;
        let book = self.book_repository.get(conn, book_id).await?;
        Ok((book, checkout))
    }

    async fn return_in(&self, uow: &mut UnitOfWork, patron_id: i64,
                       book_id: i64) -> LibraryResult<(BookEntity, CheckoutEntity)> {
        let conn = uow.conn()?;
        let mut checkout = self.checkout_repository.find_open(&mut *conn, patron_id, book_id).await?
            .ok_or_else(|| LibraryError::loan_not_found(LOAN_NOT_FOUND))?;
        checkout.return_date = Some(Utc::now().naive_utc());
        self.checkout_repository.update(&mut *conn, &checkout).await?;
        let mut book = self.book_repository.get(&mut *conn, book_id).await?;
        book.restore_copy();
        self.book_repository.update(&mut *conn, &book).await?;
        let book = self.book_repository.get(conn, book_id).await?;
        Ok((book, checkout))
    }

    // Every exit path of a unit of work ends in commit or rollback.
    async fn finish<T>(uow: UnitOfWork, res: LibraryResult<T>) -> LibraryResult<T> {
        match res {
            Ok(val) => {
                uow.commit().await?;
                Ok(val)
            }
            Err(err) => {
                uow.rollback().await;
                Err(err)
            }
        }
    }

    fn metadata(&self, patron_id: i64) -> HashMap<String, String> {
        HashMap::from([
            ("branch_id".to_string(), self.branch_id.to_string()),
            ("patron_id".to_string(), patron_id.to_string()),
        ])
    }
}

#[async_trait]
impl CheckoutService for CheckoutServiceImpl {
    async fn checkout(&self, patron_id: i64, book_id: i64,
                      due_date: Option<NaiveDateTime>) -> LibraryResult<CheckoutReceipt> {
        let due_date = due_date.unwrap_or_else(|| Utc::now().naive_utc() + Duration::days(self.book_loan_days));
        let mut uow = self.store.begin().await?;
        let res = self.borrow_in(&mut uow, patron_id, book_id, due_date).await;
        let (book, checkout) = Self::finish(uow, res).await.map_err(|err| {
            tracing::info!(patron_id, book_id, code = err.code(), error = %err, "borrow refused");
            err
        })?;
        debug_assert!(book.is_status_consistent());
        tracing::info!(patron_id, book_id, checkout_id = checkout.checkout_id, quantity = book.quantity,
            "book borrowed");
        let receipt = CheckoutReceipt::new(BookDto::from(&book), CheckoutDto::from(&checkout));
        publish_committed(self.events_publisher.as_ref(), DomainEvent::added(
            "book_borrowed", CHECKOUT_EVENTS, checkout.checkout_id.to_string().as_str(),
            &self.metadata(patron_id), &receipt)).await;
        Ok(receipt)
    }

    async fn returned(&self, patron_id: i64, book_id: i64) -> LibraryResult<CheckoutReceipt> {
        let mut uow = self.store.begin().await?;
        let res = self.return_in(&mut uow, patron_id, book_id).await;
        let (book, checkout) = Self::finish(uow, res).await.map_err(|err| {
            tracing::info!(patron_id, book_id, code = err.code(), error = %err, "return refused");
            err
        })?;
        debug_assert!(book.is_status_consistent());
        tracing::info!(patron_id, book_id, checkout_id = checkout.checkout_id, quantity = book.quantity,
            "book returned");
        let receipt = CheckoutReceipt::new(BookDto::from(&book), CheckoutDto::from(&checkout));
        publish_committed(self.events_publisher.as_ref(), DomainEvent::updated(
            "book_returned", CHECKOUT_EVENTS, checkout.checkout_id.to_string().as_str(),
            &self.metadata(patron_id), &receipt)).await;
        Ok(receipt)
    }

    async fn list_overdue(&self, as_of: NaiveDateTime) -> LibraryResult<Vec<OverdueDto>> {
        let mut conn = self.store.acquire().await?;
        let res = self.checkout_repository.query_overdue(&mut conn, as_of).await?;
        Ok(res.iter().map(OverdueDto::from).collect())
    }
}
