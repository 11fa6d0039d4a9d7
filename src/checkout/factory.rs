use crate::books::factory::create_book_repository;
use crate::checkout::domain::CheckoutService;
use crate::checkout::domain::service::CheckoutServiceImpl;
use crate::checkout::repository::CheckoutRepository;
use crate::checkout::repository::sql_checkout_repository::SqlCheckoutRepository;
use crate::core::domain::Configuration;
use crate::core::store::Store;
use crate::gateway::factory::create_publisher;

pub(crate) fn create_checkout_repository() -> Box<dyn CheckoutRepository> {
    Box::new(SqlCheckoutRepository::new())
}

pub(crate) fn create_checkout_service(config: &Configuration, store: &Store) -> Box<dyn CheckoutService> {
    let publisher = create_publisher(store.kind().gateway_publisher(), store);
    Box::new(CheckoutServiceImpl::new(config, store.clone(), create_book_repository(),
                                      create_checkout_repository(), publisher))
}
