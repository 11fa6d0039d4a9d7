use lending::checkout::controller::serve;
use lending::core::domain::Configuration;
use lending::core::library::LibraryResult;
use lending::core::repository::RepositoryStore;
use lending::utils::logs::setup_tracing;

#[tokio::main]
async fn main() -> LibraryResult<()> {
    setup_tracing();
    let config = Configuration::from_env("checkout");
    serve(config, RepositoryStore::from_env()).await
}
