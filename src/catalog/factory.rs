use crate::books::factory;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::core::store::Store;
use crate::gateway::factory::create_publisher;

pub(crate) fn create_catalog_service(config: &Configuration, store: &Store) -> Box<dyn CatalogService> {
    let book_repo = factory::create_book_repository();
    let publisher = create_publisher(store.kind().gateway_publisher(), store);
    Box::new(CatalogServiceImpl::new(config, store.clone(), book_repo, publisher))
}
