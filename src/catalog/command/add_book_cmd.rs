use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddBookCommand {
    pub(crate) fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddBookCommandRequest {
    pub(crate) isbn: String,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) published_year: i64,
    pub(crate) quantity: i64,
}

impl AddBookCommandRequest {
    pub fn new(isbn: &str, title: &str, author: &str, published_year: i64, quantity: i64) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            published_year,
            quantity,
        }
    }
    pub fn build_book(&self) -> BookDto {
        BookDto::new(self.isbn.as_str(), self.title.as_str(), self.author.as_str(),
                     self.published_year, self.quantity)
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let book = req.build_book();
        self.catalog_service.add_book(&book).await.map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::BookStatus;
    use crate::core::store::build_test_store;

    #[tokio::test]
    async fn test_should_run_add_book() {
        let (_dir, store) = build_test_store().await;
        let cmd = AddBookCommand::new(factory::create_catalog_service(&Configuration::new("test"), &store));

        let res = cmd.execute(AddBookCommandRequest::new("isbn", "test book", "author", 2010, 3))
            .await.expect("should add book");
        assert_eq!(3, res.book.quantity);
        assert_eq!(BookStatus::Available, res.book.book_status);

        let err = cmd.execute(AddBookCommandRequest::new("isbn", "test book", "author", 2010, 3))
            .await.expect_err("should fail");
        assert!(matches!(err, CommandError::DuplicateKey { .. }));
    }
}
