use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::checkout::domain::model::{CheckoutEntity, OverdueEntity};
use crate::core::domain::Identifiable;
use crate::core::library::CheckoutStatus;
use crate::utils::date::{opt_serializer, serializer};


// CheckoutDto abstracts the book that is checked out or borrowed.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct CheckoutDto {
    pub checkout_id: i64,
    pub patron_id: i64,
    pub book_id: i64,
    pub checkout_status: CheckoutStatus,
    #[serde(with = "serializer")]
    pub borrow_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    #[serde(default, with = "opt_serializer")]
    pub return_date: Option<NaiveDateTime>,
}

impl Identifiable for CheckoutDto {
    fn id(&self) -> i64 {
        self.checkout_id
    }

    fn version(&self) -> i64 {
        0
    }
}

impl From<&CheckoutEntity> for CheckoutDto {
    fn from(other: &CheckoutEntity) -> CheckoutDto {
        CheckoutDto {
            checkout_id: other.checkout_id,
            patron_id: other.patron_id,
            book_id: other.book_id,
            checkout_status: other.status(),
            borrow_date: other.borrow_date,
            due_date: other.due_date,
            return_date: other.return_date,
        }
    }
}

// CheckoutReceipt is the outcome of a borrow or return: the book after the change and the loan.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct CheckoutReceipt {
    pub book: BookDto,
    pub checkout: CheckoutDto,
}

impl CheckoutReceipt {
    pub fn new(book: BookDto, checkout: CheckoutDto) -> Self {
        Self { book, checkout }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct OverdueDto {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    #[serde(with = "serializer")]
    pub borrow_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    pub checkout_id: i64,
    pub patron_id: i64,
}

impl From<&OverdueEntity> for OverdueDto {
    fn from(other: &OverdueEntity) -> Self {
        Self {
            book_id: other.book_id,
            title: other.title.to_string(),
            author: other.author.to_string(),
            borrow_date: other.borrow_date,
            due_date: other.due_date,
            checkout_id: other.checkout_id,
            patron_id: other.patron_id,
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::checkout::domain::model::CheckoutEntity;
    use crate::checkout::dto::CheckoutDto;
    use crate::core::library::CheckoutStatus;

    #[tokio::test]
    async fn test_should_build_checkout() {
        let mut entity = CheckoutEntity::new(3, 4, Utc::now().naive_utc() + Duration::days(1));
        let checkout = CheckoutDto::from(&entity);
        assert_eq!(4, checkout.book_id);
        assert_eq!(3, checkout.patron_id);
        assert_eq!(CheckoutStatus::CheckedOut, checkout.checkout_status);

        entity.return_date = Some(Utc::now().naive_utc());
        let json = serde_json::to_value(CheckoutDto::from(&entity)).unwrap();
        assert_eq!("Returned", json["checkout_status"].as_str().unwrap());
        assert!(json["return_date"].is_string());
    }
}
