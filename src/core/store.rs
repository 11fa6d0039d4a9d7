use std::cmp;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::RepositoryStore;

pub(crate) const MAX_PAGE_SIZE: usize = 500;

const FILTER_OPS: [&str; 6] = ["=", "<", "<=", ">", ">=", "<>"];

const SCHEMA: [&str; 7] = [
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        isbn TEXT NOT NULL UNIQUE,
        published_year INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        status TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS borrowers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users (id),
        book_id INTEGER NOT NULL REFERENCES books (id),
        borrow_date TEXT NOT NULL,
        due_date TEXT NOT NULL,
        return_date TEXT
    )",
    // at most one outstanding loan per borrower and book
    "CREATE UNIQUE INDEX IF NOT EXISTS borrowers_open_ndx ON borrowers (user_id, book_id) WHERE return_date IS NULL",
    "CREATE INDEX IF NOT EXISTS borrowers_due_ndx ON borrowers (due_date) WHERE return_date IS NULL",
    "CREATE INDEX IF NOT EXISTS borrowers_book_ndx ON borrowers (book_id)",
    "CREATE TABLE IF NOT EXISTS events (
        event_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        event_group TEXT NOT NULL,
        event_key TEXT NOT NULL,
        kind TEXT NOT NULL,
        metadata TEXT NOT NULL,
        json_data TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

// Store is the handle to the shared relational store. It is created once at startup and
// injected into the services; cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    kind: RepositoryStore,
}

impl Store {
    pub async fn connect(config: &Configuration, kind: RepositoryStore) -> LibraryResult<Store> {
        let (options, max_connections) = match kind {
            RepositoryStore::Sqlite => {
                let options = SqliteConnectOptions::from_str(config.database_url.as_str())?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
                    .foreign_keys(true);
                (options, config.max_connections)
            }
            RepositoryStore::Memory => {
                // the database lives exactly as long as its only connection
                let options = SqliteConnectOptions::from_str("sqlite::memory:")?
                    .journal_mode(SqliteJournalMode::Memory)
                    .foreign_keys(true);
                (options, 1)
            }
        };
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if kind == RepositoryStore::Memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }
        let pool = pool_options.connect_with(options).await?;
        let store = Store { pool, kind };
        store.migrate().await?;
        tracing::info!(store = ?kind, max_connections, "connected library store");
        Ok(store)
    }

    pub fn kind(&self) -> RepositoryStore {
        self.kind
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> LibraryResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // plain pooled connection for reads and single-statement writes
    pub(crate) async fn acquire(&self) -> LibraryResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    // Starts a unit of work holding the store's write lock. Conflicting units of work queue
    // behind it (up to the busy timeout) instead of failing when they try to write.
    pub(crate) async fn begin(&self) -> LibraryResult<UnitOfWork> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(UnitOfWork { conn: Some(conn) })
    }
}

// UnitOfWork is one atomic, isolated span of writes on a single connection. It must end with
// `commit` or `rollback`; dropping it while open closes the connection, which rolls back.
pub(crate) struct UnitOfWork {
    conn: Option<PoolConnection<Sqlite>>,
}

impl UnitOfWork {
    pub(crate) fn conn(&mut self) -> LibraryResult<&mut SqliteConnection> {
        self.conn.as_deref_mut()
            .ok_or_else(|| LibraryError::runtime("unit of work already finished", None))
    }

    pub(crate) async fn commit(mut self) -> LibraryResult<()> {
        let mut conn = self.take()?;
        match sqlx::query("COMMIT").execute(&mut *conn).await {
            Ok(_) => Ok(()),
            Err(err) => {
                // a failed COMMIT may leave the transaction open
                rollback_or_discard(conn).await;
                Err(LibraryError::from(err))
            }
        }
    }

    pub(crate) async fn rollback(mut self) {
        if let Ok(conn) = self.take() {
            rollback_or_discard(conn).await;
        }
    }

    fn take(&mut self) -> LibraryResult<PoolConnection<Sqlite>> {
        self.conn.take()
            .ok_or_else(|| LibraryError::runtime("unit of work already finished", None))
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::warn!("unit of work dropped while open, discarding its connection");
            drop(conn.detach());
        }
    }
}

async fn rollback_or_discard(mut conn: PoolConnection<Sqlite>) {
    if let Err(err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
        tracing::warn!(error = %err, "rollback failed, discarding connection");
        drop(conn.detach());
    }
}

// Appends ` AND column op ?` for each predicate entry. Keys are `column` or `column:op`;
// `column:null` and `column:notnull` test for NULL and ignore the value.
pub(crate) fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>,
                             predicate: &HashMap<String, String>,
                             columns: &[&str]) -> LibraryResult<()> {
    let mut keys: Vec<&String> = predicate.keys().collect();
    keys.sort();
    for key in keys {
        let (column, op) = match key.split_once(':') {
            Some((column, op)) => (column, op),
            None => (key.as_str(), "="),
        };
        if !columns.contains(&column) {
            return Err(LibraryError::validation(
                format!("unsupported filter column {}", column).as_str(), None));
        }
        builder.push(" AND ").push(column);
        match op {
            "null" => { builder.push(" IS NULL"); }
            "notnull" => { builder.push(" IS NOT NULL"); }
            op if FILTER_OPS.contains(&op) => {
                builder.push(" ").push(op).push(" ").push_bind(predicate[key].clone());
            }
            other => {
                return Err(LibraryError::validation(
                    format!("unsupported filter operator {}", other).as_str(), None));
            }
        }
    }
    Ok(())
}

// offset pagination: the page token is the row offset
pub(crate) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>,
                        page: Option<&str>, page_size: usize) -> LibraryResult<(i64, usize)> {
    let offset = match page {
        Some(token) => token.parse::<i64>().map_err(|_| LibraryError::validation(
            format!("invalid page token {}", token).as_str(), None))?,
        None => 0,
    };
    let limit = cmp::max(1, cmp::min(page_size, MAX_PAGE_SIZE));
    builder.push(" LIMIT ").push_bind(limit as i64).push(" OFFSET ").push_bind(offset);
    Ok((offset, limit))
}

pub(crate) fn to_page<T>(page: Option<&str>, offset: i64, limit: usize,
                         records: Vec<T>) -> PaginatedResult<T> {
    let next_page = if records.len() == limit {
        Some((offset + limit as i64).to_string())
    } else {
        None
    };
    PaginatedResult::new(page, limit, next_page, records)
}

#[cfg(test)]
pub(crate) async fn build_test_store() -> (tempfile::TempDir, Store) {
    build_test_store_with(Configuration::new("test").max_connections).await
}

#[cfg(test)]
pub(crate) async fn build_test_store_with(max_connections: u32) -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let mut config = Configuration::new("test");
    config.max_connections = max_connections;
    config.database_url = format!("sqlite://{}", dir.path().join("library.sqlite").display());
    let store = Store::connect(&config, RepositoryStore::Sqlite).await.expect("should connect store");
    (dir, store)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use sqlx::{QueryBuilder, Sqlite};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::core::store::{build_test_store, push_page, push_predicate, to_page, Store};

    async fn count_users(store: &Store) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(store.pool()).await.expect("should count")
    }

    async fn insert_user(conn: &mut sqlx::SqliteConnection, username: &str) {
        sqlx::query("INSERT INTO users (username, role, created_at) VALUES (?, 'member', '2024-01-01 00:00:00')")
            .bind(username)
            .execute(conn).await.expect("should insert user");
    }

    #[tokio::test]
    async fn test_should_commit_unit_of_work() {
        let (_dir, store) = build_test_store().await;
        let mut uow = store.begin().await.expect("should begin");
        insert_user(uow.conn().expect("open"), "alice").await;
        uow.commit().await.expect("should commit");
        assert_eq!(1, count_users(&store).await);
    }

    #[tokio::test]
    async fn test_should_rollback_unit_of_work() {
        let (_dir, store) = build_test_store().await;
        let mut uow = store.begin().await.expect("should begin");
        insert_user(uow.conn().expect("open"), "bob").await;
        uow.rollback().await;
        assert_eq!(0, count_users(&store).await);
    }

    #[tokio::test]
    async fn test_should_discard_dropped_unit_of_work() {
        let (_dir, store) = build_test_store().await;
        {
            let mut uow = store.begin().await.expect("should begin");
            insert_user(uow.conn().expect("open"), "carol").await;
        }
        // the write lock is gone once the connection closed, so a new unit of work can start
        let mut uow = store.begin().await.expect("should begin again");
        insert_user(uow.conn().expect("open"), "dave").await;
        uow.commit().await.expect("should commit");
        assert_eq!(1, count_users(&store).await);
    }

    #[tokio::test]
    async fn test_should_connect_memory_store() {
        let store = Store::connect(&Configuration::new("test"), RepositoryStore::Memory)
            .await.expect("should connect");
        assert_eq!(RepositoryStore::Memory, store.kind());
        let mut uow = store.begin().await.expect("should begin");
        insert_user(uow.conn().expect("open"), "erin").await;
        uow.commit().await.expect("should commit");
        assert_eq!(1, count_users(&store).await);
    }

    #[tokio::test]
    async fn test_should_build_predicate() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM borrowers WHERE 1 = 1");
        let predicate = HashMap::from([
            ("book_id".to_string(), "7".to_string()),
            ("due_date:<".to_string(), "2024-01-01 00:00:00".to_string()),
            ("return_date:null".to_string(), "".to_string()),
        ]);
        push_predicate(&mut builder, &predicate, &["book_id", "due_date", "return_date"]).expect("should build");
        assert_eq!("SELECT * FROM borrowers WHERE 1 = 1 AND book_id = ? AND due_date < ? AND return_date IS NULL",
                   builder.sql());
    }

    #[tokio::test]
    async fn test_should_reject_unknown_filters() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM books WHERE 1 = 1");
        let predicate = HashMap::from([("password".to_string(), "x".to_string())]);
        assert!(push_predicate(&mut builder, &predicate, &["title"]).is_err());
        let predicate = HashMap::from([("title:like".to_string(), "x".to_string())]);
        assert!(push_predicate(&mut builder, &predicate, &["title"]).is_err());
    }

    #[tokio::test]
    async fn test_should_paginate() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM books");
        let (offset, limit) = push_page(&mut builder, Some("20"), 10).expect("should page");
        assert_eq!(20, offset);
        assert_eq!(10, limit);
        let full = to_page(Some("20"), offset, limit, vec![0; 10]);
        assert_eq!(Some("30".to_string()), full.next_page);
        let partial = to_page(Some("20"), offset, limit, vec![0; 3]);
        assert_eq!(None, partial.next_page);
        assert!(push_page(&mut builder, Some("abc"), 10).is_err());
    }
}
