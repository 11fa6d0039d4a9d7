use crate::core::domain::Configuration;
use crate::core::store::Store;
use crate::patrons::domain::PatronService;
use crate::patrons::domain::service::PatronServiceImpl;
use crate::patrons::repository::PatronRepository;
use crate::patrons::repository::sql_patron_repository::SqlPatronRepository;

pub(crate) fn create_patron_repository() -> Box<dyn PatronRepository> {
    Box::new(SqlPatronRepository::new())
}

pub(crate) fn create_patron_service(config: &Configuration, store: &Store) -> Box<dyn PatronService> {
    Box::new(PatronServiceImpl::new(config, store.clone(), create_patron_repository()))
}
