use std::collections::HashMap;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::library::PaginatedResult;

const DEFAULT_PAGE_SIZE: usize = 50;

pub(crate) struct ListBooksCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl ListBooksCommand {
    pub(crate) fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListBooksCommandRequest {
    pub page: Option<String>,
    pub page_size: usize,
    pub predicate: HashMap<String, String>,
}

impl ListBooksCommandRequest {
    // `page` and `page_size` are paging parameters, every other entry is a column filter
    pub fn from_params(mut params: HashMap<String, String>) -> Result<Self, CommandError> {
        let page = params.remove("page");
        let page_size = match params.remove("page_size") {
            Some(size) => size.parse::<usize>().map_err(|_| CommandError::Validation {
                message: format!("invalid page_size {}", size),
                reason_code: Some("page_size".to_string()),
            })?,
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(Self { page, page_size, predicate: params })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListBooksCommandResponse {
    pub books: PaginatedResult<BookDto>,
}

impl ListBooksCommandResponse {
    pub fn new(books: PaginatedResult<BookDto>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<ListBooksCommandRequest, ListBooksCommandResponse> for ListBooksCommand {
    async fn execute(&self, req: ListBooksCommandRequest) -> Result<ListBooksCommandResponse, CommandError> {
        self.catalog_service.list_books(&req.predicate, req.page.as_deref(), req.page_size)
            .await.map_err(CommandError::from).map(ListBooksCommandResponse::new)
    }
}
