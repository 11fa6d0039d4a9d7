use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::checkout::domain::CheckoutService;
use crate::checkout::dto::CheckoutReceipt;
use crate::core::command::{Command, CommandError};

pub(crate) struct ReturnBookCommand {
    checkout_service: Box<dyn CheckoutService>,
}

impl ReturnBookCommand {
    pub(crate) fn new(checkout_service: Box<dyn CheckoutService>) -> Self {
        Self {
            checkout_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnBookCommandRequest {
    #[serde(default)]
    pub(crate) patron_id: i64,
    pub(crate) book_id: i64,
}

impl ReturnBookCommandRequest {
    pub fn new(patron_id: i64, book_id: i64) -> Self {
        Self {
            patron_id,
            book_id,
        }
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct ReturnBookCommandResponse {
    pub receipt: CheckoutReceipt,
}

impl ReturnBookCommandResponse {
    pub fn new(receipt: CheckoutReceipt) -> Self {
        Self {
            receipt,
        }
    }
}

#[async_trait]
impl Command<ReturnBookCommandRequest, ReturnBookCommandResponse> for ReturnBookCommand {
    async fn execute(&self, req: ReturnBookCommandRequest) -> Result<ReturnBookCommandResponse, CommandError> {
        self.checkout_service.returned(req.patron_id, req.book_id)
            .await.map_err(CommandError::from).map(ReturnBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::checkout::command::return_book_cmd::{ReturnBookCommand, ReturnBookCommandRequest};
    use crate::checkout::factory::create_checkout_service;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::{BookStatus, CheckoutStatus};
    use crate::core::store::build_test_store;
    use crate::utils::fixtures;

    #[tokio::test]
    async fn test_should_run_return_book() {
        let (_dir, store) = build_test_store().await;
        let patron_id = fixtures::add_patron(&store, "alice").await;
        let book = fixtures::add_book(&store, "isbn", 1).await;
        let svc = create_checkout_service(&Configuration::new("test"), &store);
        svc.checkout(patron_id, book.book_id, None).await.expect("should checkout book");

        let cmd = ReturnBookCommand::new(svc);
        let res = cmd.execute(ReturnBookCommandRequest::new(patron_id, book.book_id))
            .await.expect("should return book");
        assert_eq!(CheckoutStatus::Returned, res.receipt.checkout.checkout_status);
        assert_eq!(BookStatus::Available, res.receipt.book.book_status);
        assert_eq!(1, res.receipt.book.quantity);

        let err = cmd.execute(ReturnBookCommandRequest::new(patron_id, book.book_id))
            .await.expect_err("should fail");
        assert!(matches!(err, CommandError::LoanNotFound { .. }));
    }
}
