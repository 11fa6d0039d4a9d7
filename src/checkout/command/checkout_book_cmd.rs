use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::checkout::domain::CheckoutService;
use crate::checkout::dto::CheckoutReceipt;
use crate::core::command::{Command, CommandError};
use crate::utils::date::opt_serializer;

pub(crate) struct CheckoutBookCommand {
    checkout_service: Box<dyn CheckoutService>,
}

impl CheckoutBookCommand {
    pub(crate) fn new(checkout_service: Box<dyn CheckoutService>) -> Self {
        Self {
            checkout_service,
        }
    }
}

// patron_id comes from the authenticated caller, not the request body
#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutBookCommandRequest {
    #[serde(default)]
    pub(crate) patron_id: i64,
    pub(crate) book_id: i64,
    #[serde(default, with = "opt_serializer")]
    pub(crate) due_date: Option<NaiveDateTime>,
}

impl CheckoutBookCommandRequest {
    pub fn new(patron_id: i64, book_id: i64, due_date: Option<NaiveDateTime>) -> Self {
        Self {
            patron_id,
            book_id,
            due_date,
        }
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct CheckoutBookCommandResponse {
    pub receipt: CheckoutReceipt,
}

impl CheckoutBookCommandResponse {
    pub fn new(receipt: CheckoutReceipt) -> Self {
        Self {
            receipt,
        }
    }
}

#[async_trait]
impl Command<CheckoutBookCommandRequest, CheckoutBookCommandResponse> for CheckoutBookCommand {
    async fn execute(&self, req: CheckoutBookCommandRequest) -> Result<CheckoutBookCommandResponse, CommandError> {
        self.checkout_service.checkout(req.patron_id, req.book_id, req.due_date)
            .await.map_err(CommandError::from).map(CheckoutBookCommandResponse::new)
    }
}
