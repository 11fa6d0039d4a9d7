use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::core::store::{push_page, push_predicate, to_page};
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;

const PATRON_FILTERS: [&str; 3] = ["id", "username", "role"];

#[derive(Debug, Default)]
pub struct SqlPatronRepository {}

impl SqlPatronRepository {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Repository<PatronEntity> for SqlPatronRepository {
    async fn create(&self, conn: &mut SqliteConnection, entity: &PatronEntity) -> LibraryResult<i64> {
        sqlx::query("INSERT INTO users (username, role, created_at) VALUES (?, ?, ?)")
            .bind(entity.username.as_str())
            .bind(entity.role)
            .bind(entity.created_at)
            .execute(conn)
            .await.map(|res| res.last_insert_rowid()).map_err(LibraryError::from)
    }

    async fn update(&self, conn: &mut SqliteConnection, entity: &PatronEntity) -> LibraryResult<usize> {
        let updated = sqlx::query("UPDATE users SET username = ?, role = ? WHERE id = ?")
            .bind(entity.username.as_str())
            .bind(entity.role)
            .bind(entity.patron_id)
            .execute(conn)
            .await?
            .rows_affected() as usize;
        if updated == 0 {
            return Err(LibraryError::not_found(format!("patron {} not found", entity.patron_id).as_str()));
        }
        Ok(updated)
    }

    async fn get(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<PatronEntity> {
        sqlx::query_as::<_, PatronEntity>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("patron {} not found", id).as_str()))
    }

    async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> LibraryResult<usize> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?
            .rows_affected() as usize;
        if deleted == 0 {
            return Err(LibraryError::not_found(format!("patron {} not found", id).as_str()));
        }
        Ok(deleted)
    }

    async fn query(&self, conn: &mut SqliteConnection, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE 1 = 1");
        push_predicate(&mut builder, predicate, &PATRON_FILTERS)?;
        builder.push(" ORDER BY id");
        let (offset, limit) = push_page(&mut builder, page, page_size)?;
        let records = builder.build_query_as::<PatronEntity>()
            .fetch_all(conn)
            .await?;
        Ok(to_page(page, offset, limit, records))
    }
}

#[async_trait]
impl PatronRepository for SqlPatronRepository {
    async fn find_by_username(&self, conn: &mut SqliteConnection, username: &str) -> LibraryResult<Option<PatronEntity>> {
        sqlx::query_as::<_, PatronEntity>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(conn)
            .await.map_err(LibraryError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::library::{LibraryError, Role};
    use crate::core::repository::Repository;
    use crate::core::store::build_test_store;
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::repository::PatronRepository;
    use crate::patrons::repository::sql_patron_repository::SqlPatronRepository;

    #[tokio::test]
    async fn test_should_create_get_patrons() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlPatronRepository::new();
        let id = repo.create(&mut conn, &PatronEntity::new("alice", Role::Member)).await.expect("should create patron");
        let loaded = repo.get(&mut conn, id).await.expect("should return patron");
        assert_eq!("alice", loaded.username.as_str());
        assert_eq!(Role::Member, loaded.role);
        let by_name = repo.find_by_username(&mut conn, "alice").await.expect("should query");
        assert_eq!(Some(id), by_name.map(|p| p.patron_id));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_username() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlPatronRepository::new();
        repo.create(&mut conn, &PatronEntity::new("bob", Role::Member)).await.expect("should create patron");
        let err = repo.create(&mut conn, &PatronEntity::new("bob", Role::Admin)).await.expect_err("should fail");
        assert!(matches!(err, LibraryError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_should_update_query_delete_patrons() {
        let (_dir, store) = build_test_store().await;
        let mut conn = store.acquire().await.expect("should acquire");
        let repo = SqlPatronRepository::new();
        let id = repo.create(&mut conn, &PatronEntity::new("carol", Role::Member)).await.expect("should create patron");
        let mut patron = repo.get(&mut conn, id).await.expect("should return patron");
        patron.role = Role::Admin;
        repo.update(&mut conn, &patron).await.expect("should update patron");

        let admins = repo.query(&mut conn, &HashMap::from([("role".to_string(), "admin".to_string())]), None, 10)
            .await.expect("should query");
        assert_eq!(1, admins.records.len());

        repo.delete(&mut conn, id).await.expect("should delete patron");
        assert!(matches!(repo.get(&mut conn, id).await, Err(LibraryError::NotFound { .. })));
    }
}
