use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::core::store::{push_page, push_predicate, to_page};

const BOOK_FILTERS: [&str; 8] = ["id", "title", "author", "isbn", "published_year", "quantity", "status", "version"];

#[derive(Debug, Default)]
pub struct SqlBookRepository {}

impl SqlBookRepository {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Repository<BookEntity> for SqlBookRepository {
    async fn create(&self, conn: &mut SqliteConnection, entity: &BookEntity) -> LibraryResult<i64> {
        let now = Utc::now().naive_utc();
        sqlx::query("INSERT INTO books (title, author, isbn, published_year, quantity, status, version, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)")
            .bind(entity.title.as_str())
            .bind(entity.author.as_str())
            .bind(entity.isbn.as_str())
            .bind(entity.published_year)
            .bind(entity.quantity)
            .bind(entity.book_status)
            .bind(now)
            .bind(now)
            .execute(conn)
            .await.map(|res| res.last_insert_rowid()).map_err(LibraryError::from)
    }

    // Writes the entity if the stored version still matches and bumps the version.
    async fn update(&self, conn: &mut SqliteConnection, entity: &BookEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let updated = sqlx::query("UPDATE books SET title = ?, author = ?, isbn = ?, published_year = ?, quantity = ?, \
                                   status = ?, version = version + 1, updated_at = ? WHERE id = ? AND version = ?")
            .bind(entity.title.as_str())
            .bind(entity.author.as_str())
            .bind(entity.isbn.as_str())
            .bind(entity.published_year)
            .bind(entity.quantity)
            .bind(entity.book_status)
            .bind(now)
            .bind(entity.book_id)
            .bind(entity.version)
            .execute(&mut *conn)
            .await?
            .rows_affected() as usize;
        if updated == 0 {
            // tell a missing row apart from a stale version
            self.get(conn, entity.book_id).await?;
            return Err(LibraryError::database(
                format!("book {} was modified concurrently", entity.book_id).as_str(),
                Some("version_conflict".to_string()), true));
        }
        Ok(updated)
    }

    async fn get(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<BookEntity> {
        sqlx::query_as::<_, BookEntity>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| LibraryError::not_found("Book not found"))
    }

    async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<usize> {
        let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?
            .rows_affected() as usize;
        if deleted == 0 {
            return Err(LibraryError::not_found("Book not found"));
        }
        Ok(deleted)
    }

    async fn query(&self, conn: &mut SqliteConnection, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM books WHERE 1 = 1");
        push_predicate(&mut builder, predicate, &BOOK_FILTERS)?;
        builder.push(" ORDER BY id");
        let (offset, limit) = push_page(&mut builder, page, page_size)?;
        let records = builder.build_query_as::<BookEntity>()
            .fetch_all(conn)
            .await?;
        Ok(to_page(page, offset, limit, records))
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn find_by_isbn(&self, conn: &mut SqliteConnection, isbn: &str) -> LibraryResult<Option<BookEntity>> {
        sqlx::query_as::<_, BookEntity>("SELECT * FROM books WHERE isbn = ?")
            .bind(isbn)
            .fetch_optional(conn)
            .await.map_err(LibraryError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::BookRepository;
    use crate::books::repository::sql_book_repository::SqlBookRepository;
    use crate::core::library::{BookStatus, LibraryError};
    use crate::core::repository::Repository;
    use crate::core::store::build_test_store;

    #[tokio::test]
    async fn test_should_create_get_books() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlBookRepository::new();
        let book = BookEntity::new("978-0", "Dune", "Herbert", 1965, 2);
        let id = repo.create(&mut conn, &book).await.expect("should create book");
        let loaded = repo.get(&mut conn, id).await.expect("should return book");
        assert_eq!(id, loaded.book_id);
        assert_eq!(0, loaded.version);
        assert_eq!("Dune", loaded.title.as_str());
        assert_eq!(2, loaded.quantity);
        assert_eq!(BookStatus::Available, loaded.book_status);
        let by_isbn = repo.find_by_isbn(&mut conn, "978-0").await.expect("should query isbn");
        assert_eq!(Some(id), by_isbn.map(|b| b.book_id));
        assert_eq!(None, repo.find_by_isbn(&mut conn, "missing").await.expect("should query isbn"));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlBookRepository::new();
        let book = BookEntity::new("978-1", "Emma", "Austen", 1815, 1);
        repo.create(&mut conn, &book).await.expect("should create book");
        let err = repo.create(&mut conn, &book).await.expect_err("should fail");
        assert!(matches!(err, LibraryError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_should_update_books_with_version() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlBookRepository::new();
        let id = repo.create(&mut conn, &BookEntity::new("978-2", "Ulysses", "Joyce", 1922, 1))
            .await.expect("should create book");
        let mut book = repo.get(&mut conn, id).await.expect("should return book");
        book.lend_copy();
        assert_eq!(1, repo.update(&mut conn, &book).await.expect("should update"));
        let loaded = repo.get(&mut conn, id).await.expect("should return book");
        assert_eq!(1, loaded.version);
        assert_eq!(0, loaded.quantity);
        assert_eq!(BookStatus::Borrowed, loaded.book_status);

        // stale version
        let err = repo.update(&mut conn, &book).await.expect_err("should fail");
        assert!(err.retryable());

        book.book_id = 999;
        let err = repo.update(&mut conn, &book).await.expect_err("should fail");
        assert!(matches!(err, LibraryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_negative_quantity() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlBookRepository::new();
        let id = repo.create(&mut conn, &BookEntity::new("978-3", "Beloved", "Morrison", 1987, 1))
            .await.expect("should create book");
        let mut book = repo.get(&mut conn, id).await.expect("should return book");
        book.quantity = -1;
        let err = repo.update(&mut conn, &book).await.expect_err("should fail");
        assert!(matches!(err, LibraryError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_should_delete_books() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlBookRepository::new();
        let id = repo.create(&mut conn, &BookEntity::new("978-4", "Kindred", "Butler", 1979, 1))
            .await.expect("should create book");
        assert_eq!(1, repo.delete(&mut conn, id).await.expect("should delete"));
        assert!(matches!(repo.get(&mut conn, id).await, Err(LibraryError::NotFound { .. })));
        assert!(matches!(repo.delete(&mut conn, id).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_query_books() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlBookRepository::new();
        for i in 0..5 {
            let quantity = if i % 2 == 0 { 0 } else { 3 };
            repo.create(&mut conn, &BookEntity::new(format!("isbn-{}", i).as_str(), "title", "author", 2000 + i, quantity))
                .await.expect("should create book");
        }
        let borrowed = repo.query(&mut conn, &HashMap::from([("status".to_string(), "borrowed".to_string())]), None, 10)
            .await.expect("should query");
        assert_eq!(3, borrowed.records.len());
        assert_eq!(None, borrowed.next_page);

        let recent = repo.query(&mut conn, &HashMap::from([("published_year:>=".to_string(), "2003".to_string())]), None, 10)
            .await.expect("should query");
        assert_eq!(2, recent.records.len());

        let first = repo.query(&mut conn, &HashMap::new(), None, 2).await.expect("should query");
        assert_eq!(2, first.records.len());
        let next = first.next_page.clone().expect("should have next page");
        let second = repo.query(&mut conn, &HashMap::new(), Some(next.as_str()), 2).await.expect("should query");
        assert_eq!(2, second.records.len());
        assert!(second.records[0].book_id > first.records[1].book_id);
    }
}
