use async_trait::async_trait;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::core::store::Store;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::domain::PatronService;
use crate::patrons::dto::PatronDto;
use crate::patrons::repository::PatronRepository;

pub(crate) struct PatronServiceImpl {
    store: Store,
    patron_repository: Box<dyn PatronRepository>,
}

impl PatronServiceImpl {
    pub(crate) fn new(_config: &Configuration, store: Store, patron_repository: Box<dyn PatronRepository>) -> Self {
        PatronServiceImpl {
            store,
            patron_repository,
        }
    }
}

#[async_trait]
impl PatronService for PatronServiceImpl {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto> {
        if patron.username.trim().is_empty() {
            return Err(LibraryError::validation("username must not be empty", Some("username".to_string())));
        }
        let mut conn = self.store.acquire().await?;
        let mut entity = PatronEntity::from(patron);
        entity.patron_id = self.patron_repository.create(&mut conn, &entity).await?;
        tracing::info!(patron_id = entity.patron_id, role = %entity.role, "added patron");
        Ok(PatronDto::from(&entity))
    }

    async fn find_patron_by_id(&self, id: i64) -> LibraryResult<PatronDto> {
        let mut conn = self.store.acquire().await?;
        self.patron_repository.get(&mut conn, id).await.map(|p| PatronDto::from(&p))
    }

    async fn find_patron_by_username(&self, username: &str) -> LibraryResult<Option<PatronDto>> {
        let mut conn = self.store.acquire().await?;
        let res = self.patron_repository.find_by_username(&mut conn, username).await?;
        Ok(res.as_ref().map(PatronDto::from))
    }
}
