use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::core::library::BookStatus;
use crate::utils::date::serializer;

// BookEntity abstracts a catalog title and the number of its copies currently on the shelf.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct BookEntity {
    #[sqlx(rename = "id")]
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: i64,
    pub quantity: i64,
    #[sqlx(rename = "status")]
    pub book_status: BookStatus,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(isbn: &str, title: &str, author: &str, published_year: i64, quantity: i64) -> Self {
        Self {
            book_id: 0,
            version: 0,
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            published_year,
            quantity,
            book_status: BookStatus::for_quantity(quantity),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // Takes one copy off the shelf. The status flips only on the transition to zero.
    pub fn lend_copy(&mut self) {
        self.quantity -= 1;
        if self.quantity == 0 {
            self.book_status = BookStatus::Borrowed;
        }
    }

    // Puts one copy back; any return leaves at least one copy free.
    pub fn restore_copy(&mut self) {
        self.quantity += 1;
        self.book_status = BookStatus::Available;
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> i64 {
        self.book_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookEntity {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn status(&self) -> BookStatus {
        self.book_status
    }
}
