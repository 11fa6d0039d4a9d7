use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use crate::checkout::domain::CheckoutService;
use crate::checkout::dto::OverdueDto;
use crate::core::command::{Command, CommandError};
use crate::utils::date::parse_date;

pub(crate) struct OverdueBooksCommand {
    checkout_service: Box<dyn CheckoutService>,
}

impl OverdueBooksCommand {
    pub(crate) fn new(checkout_service: Box<dyn CheckoutService>) -> Self {
        Self {
            checkout_service,
        }
    }
}

// as_of defaults to the time the command runs
#[derive(Debug, Default)]
pub(crate) struct OverdueBooksCommandRequest {
    pub as_of: Option<NaiveDateTime>,
}

impl OverdueBooksCommandRequest {
    pub fn new(as_of: Option<NaiveDateTime>) -> Self {
        Self {
            as_of,
        }
    }

    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, CommandError> {
        let as_of = match params.get("as_of") {
            Some(val) => Some(parse_date(val.as_str()).map_err(|_| CommandError::Validation {
                message: format!("invalid as_of {}", val),
                reason_code: Some("as_of".to_string()),
            })?),
            None => None,
        };
        Ok(Self::new(as_of))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OverdueBooksCommandResponse {
    pub overdue: Vec<OverdueDto>,
}

impl OverdueBooksCommandResponse {
    pub fn new(overdue: Vec<OverdueDto>) -> Self {
        Self {
            overdue,
        }
    }
}

#[async_trait]
impl Command<OverdueBooksCommandRequest, OverdueBooksCommandResponse> for OverdueBooksCommand {
    async fn execute(&self, req: OverdueBooksCommandRequest) -> Result<OverdueBooksCommandResponse, CommandError> {
        let as_of = req.as_of.unwrap_or_else(|| chrono::Utc::now().naive_utc());
        self.checkout_service.list_overdue(as_of)
            .await.map_err(CommandError::from).map(OverdueBooksCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use chrono::{Duration, Utc};
    use crate::checkout::command::overdue_books_cmd::{OverdueBooksCommand, OverdueBooksCommandRequest};
    use crate::checkout::factory::create_checkout_service;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::store::build_test_store;
    use crate::utils::fixtures;

    #[tokio::test]
    async fn test_should_parse_overdue_params() {
        let req = OverdueBooksCommandRequest::from_params(&HashMap::new()).expect("should parse");
        assert_eq!(None, req.as_of);
        let req = OverdueBooksCommandRequest::from_params(&HashMap::from([
            ("as_of".to_string(), "2024-03-01T00:00:00Z".to_string())])).expect("should parse");
        assert_eq!("2024-03-01", req.as_of.expect("should have as_of").date().to_string());
        let err = OverdueBooksCommandRequest::from_params(&HashMap::from([
            ("as_of".to_string(), "yesterday".to_string())])).expect_err("should fail");
        assert!(matches!(err, CommandError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_should_run_overdue_books() {
        let (_dir, store) = build_test_store().await;
        let patron_id = fixtures::add_patron(&store, "alice").await;
        let late = fixtures::add_book(&store, "isbn-1", 1).await;
        let on_time = fixtures::add_book(&store, "isbn-2", 1).await;
        fixtures::add_loan(&store, patron_id, late.book_id, -2).await;
        fixtures::add_loan(&store, patron_id, on_time.book_id, 2).await;

        let cmd = OverdueBooksCommand::new(create_checkout_service(&Configuration::new("test"), &store));
        let res = cmd.execute(OverdueBooksCommandRequest::default()).await.expect("should list overdue");
        assert_eq!(1, res.overdue.len());
        assert_eq!(late.book_id, res.overdue[0].book_id);

        let res = cmd.execute(OverdueBooksCommandRequest::new(Some(Utc::now().naive_utc() + Duration::days(5))))
            .await.expect("should list overdue");
        assert_eq!(2, res.overdue.len());
    }
}
