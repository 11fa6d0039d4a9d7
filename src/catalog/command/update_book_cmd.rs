use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct UpdateBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub(crate) fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// Status is not accepted here, it always follows the quantity.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateBookCommandRequest {
    #[serde(default)]
    pub book_id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub published_year: i64,
    pub quantity: i64,
}

impl UpdateBookCommandRequest {
    pub fn new(book_id: i64, isbn: &str, title: &str, author: &str, published_year: i64, quantity: i64) -> Self {
        Self {
            book_id,
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            published_year,
            quantity,
        }
    }
    pub fn build_book(&self) -> BookDto {
        let mut book = BookDto::new(self.isbn.as_str(), self.title.as_str(), self.author.as_str(),
                                    self.published_year, self.quantity);
        book.book_id = self.book_id;
        book
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct UpdateBookCommandResponse {
    pub book: BookDto,
}

impl UpdateBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        let book = req.build_book();
        self.catalog_service.update_book(&book).await.map_err(CommandError::from).map(UpdateBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::books::dto::BookDto;
    use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::BookStatus;
    use crate::core::store::build_test_store;

    #[tokio::test]
    async fn test_should_run_update_book() {
        let (_dir, store) = build_test_store().await;
        let svc = factory::create_catalog_service(&Configuration::new("test"), &store);
        let book = svc.add_book(&BookDto::new("isbn", "test book", "author", 2010, 1)).await.expect("should add book");

        let cmd = UpdateBookCommand::new(svc);
        let req = UpdateBookCommandRequest::new(book.book_id, "isbn", "second edition", "author", 2011, 0);
        let res = cmd.execute(req).await.expect("should update book");
        assert_eq!("second edition", res.book.title.as_str());
        assert_eq!(BookStatus::Borrowed, res.book.book_status);

        let req = UpdateBookCommandRequest::new(book.book_id, "isbn", "", "author", 2011, 1);
        let err = cmd.execute(req).await.expect_err("should fail");
        assert!(matches!(err, CommandError::Validation { .. }));
    }
}
