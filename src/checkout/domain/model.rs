use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::core::domain::Identifiable;
use crate::core::library::CheckoutStatus;
use crate::utils::date::{opt_serializer, serializer};

// CheckoutEntity abstracts the book that is checked out or borrowed, one row of `borrowers`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CheckoutEntity {
    #[sqlx(rename = "id")]
    pub checkout_id: i64,
    #[sqlx(rename = "user_id")]
    pub patron_id: i64,
    pub book_id: i64,
    #[serde(with = "serializer")]
    pub borrow_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    #[serde(default, with = "opt_serializer")]
    pub return_date: Option<NaiveDateTime>,
}

impl CheckoutEntity {
    pub fn new(patron_id: i64, book_id: i64, due_date: NaiveDateTime) -> Self {
        Self {
            checkout_id: 0,
            patron_id,
            book_id,
            borrow_date: Utc::now().naive_utc(),
            due_date,
            return_date: None,
        }
    }

    pub fn status(&self) -> CheckoutStatus {
        match self.return_date {
            Some(_) => CheckoutStatus::Returned,
            None => CheckoutStatus::CheckedOut,
        }
    }

    pub fn is_overdue(&self, as_of: NaiveDateTime) -> bool {
        self.return_date.is_none() && self.due_date < as_of
    }
}

impl Identifiable for CheckoutEntity {
    fn id(&self) -> i64 {
        self.checkout_id
    }

    fn version(&self) -> i64 {
        0
    }
}

// OverdueEntity is an outstanding loan joined with the title it is for.
#[derive(Debug, PartialEq, Clone, FromRow)]
pub(crate) struct OverdueEntity {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub checkout_id: i64,
    pub patron_id: i64,
}
