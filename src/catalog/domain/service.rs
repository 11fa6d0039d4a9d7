use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{BookStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::core::store::{Store, UnitOfWork};
use crate::gateway::events::{EventPublisher, publish_committed};

const BOOKS_EVENTS: &str = "books";
const DUPLICATE_ISBN: &str = "Book with same ISBN already exists.";
const MIN_PUBLISHED_YEAR: i64 = 1000;

pub(crate) struct CatalogServiceImpl {
    store: Store,
    book_repository: Box<dyn BookRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(_config: &Configuration, store: Store, book_repository: Box<dyn BookRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            store,
            book_repository,
            events_publisher,
        }
    }

    async fn update_in(&self, uow: &mut UnitOfWork, book: &BookDto) -> LibraryResult<BookEntity> {
        let conn = uow.conn()?;
        let mut entity = self.book_repository.get(&mut *conn, book.book_id).await?;
        if let Some(other) = self.book_repository.find_by_isbn(&mut *conn, book.isbn.trim()).await? {
            if other.book_id != entity.book_id {
                return Err(LibraryError::duplicate_key(DUPLICATE_ISBN));
            }
        }
        entity.title = book.title.trim().to_string();
        entity.author = book.author.trim().to_string();
        entity.isbn = book.isbn.trim().to_string();
        entity.published_year = book.published_year;
        entity.quantity = book.quantity;
        entity.book_status = BookStatus::for_quantity(book.quantity);
        self.book_repository.update(&mut *conn, &entity).await?;
        self.book_repository.get(conn, entity.book_id).await
    }
}

fn validate_book(book: &BookDto, min_quantity: i64) -> LibraryResult<()> {
    for (field, value) in [("title", &book.title), ("author", &book.author), ("isbn", &book.isbn)] {
        if value.trim().is_empty() {
            return Err(LibraryError::validation(
                format!("{} must not be empty", field).as_str(), Some(field.to_string())));
        }
    }
    let current_year = Utc::now().year() as i64;
    if book.published_year < MIN_PUBLISHED_YEAR || book.published_year > current_year {
        return Err(LibraryError::validation(
            format!("published_year must be between {} and {}", MIN_PUBLISHED_YEAR, current_year).as_str(),
            Some("published_year".to_string())));
    }
    if book.quantity < min_quantity {
        return Err(LibraryError::validation(
            format!("quantity must be at least {}", min_quantity).as_str(), Some("quantity".to_string())));
    }
    Ok(())
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        validate_book(book, 1)?;
        // the connection goes back to the pool before the event is published
        let saved = {
            let mut conn = self.store.acquire().await?;
            if self.book_repository.find_by_isbn(&mut conn, book.isbn.trim()).await?.is_some() {
                return Err(LibraryError::duplicate_key(DUPLICATE_ISBN));
            }
            let entity = BookEntity::new(book.isbn.trim(), book.title.trim(), book.author.trim(),
                                         book.published_year, book.quantity);
            let id = self.book_repository.create(&mut conn, &entity).await.map_err(|err| match err {
                // lost a race with a concurrent add of the same ISBN
                LibraryError::DuplicateKey { .. } => LibraryError::duplicate_key(DUPLICATE_ISBN),
                other => other,
            })?;
            BookDto::from(&self.book_repository.get(&mut conn, id).await?)
        };
        tracing::info!(book_id = saved.book_id, isbn = saved.isbn.as_str(), "added book");
        publish_committed(self.events_publisher.as_ref(), DomainEvent::added(
            BOOKS_EVENTS, BOOKS_EVENTS, saved.book_id.to_string().as_str(), &HashMap::new(), &saved)).await;
        Ok(saved)
    }

    async fn remove_book(&self, id: i64) -> LibraryResult<()> {
        {
            let mut conn = self.store.acquire().await?;
            self.book_repository.delete(&mut conn, id).await.map_err(|err| match err {
                LibraryError::Validation { reason_code, .. } => LibraryError::validation(
                    "book has loan history and cannot be removed", reason_code),
                other => other,
            })?;
        }
        tracing::info!(book_id = id, "removed book");
        publish_committed(self.events_publisher.as_ref(), DomainEvent::deleted(
            BOOKS_EVENTS, BOOKS_EVENTS, id.to_string().as_str(), &HashMap::new(), &id)).await;
        Ok(())
    }

    async fn update_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        validate_book(book, 0)?;
        let mut uow = self.store.begin().await?;
        let updated = match self.update_in(&mut uow, book).await {
            Ok(updated) => {
                uow.commit().await?;
                updated
            }
            Err(err) => {
                uow.rollback().await;
                return Err(err);
            }
        };
        let saved = BookDto::from(&updated);
        tracing::info!(book_id = saved.book_id, version = saved.version, "updated book");
        publish_committed(self.events_publisher.as_ref(), DomainEvent::updated(
            BOOKS_EVENTS, BOOKS_EVENTS, saved.book_id.to_string().as_str(), &HashMap::new(), &saved)).await;
        Ok(saved)
    }

    async fn find_book_by_id(&self, id: i64) -> LibraryResult<BookDto> {
        let mut conn = self.store.acquire().await?;
        self.book_repository.get(&mut conn, id).await.map(|b| BookDto::from(&b))
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<Option<BookDto>> {
        let mut conn = self.store.acquire().await?;
        let res = self.book_repository.find_by_isbn(&mut conn, isbn).await?;
        Ok(res.as_ref().map(BookDto::from))
    }

    async fn list_books(&self, predicate: &HashMap<String, String>,
                        page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>> {
        let mut conn = self.store.acquire().await?;
        let res = self.book_repository.query(&mut conn, predicate, page, page_size).await?;
        Ok(PaginatedResult::new(page, res.page_size, res.next_page,
                                res.records.iter().map(BookDto::from).collect()))
    }
}
