use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;
use crate::core::library::BookStatus;
use crate::utils::date::serializer;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookDto {
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: i64,
    pub quantity: i64,
    pub book_status: BookStatus,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookDto {
    pub fn new(isbn: &str, title: &str, author: &str, published_year: i64, quantity: i64) -> BookDto {
        BookDto::from(&BookEntity::new(isbn, title, author, published_year, quantity))
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> i64 {
        self.book_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookDto {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn status(&self) -> BookStatus {
        self.book_status
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            isbn: other.isbn.to_string(),
            published_year: other.published_year,
            quantity: other.quantity,
            book_status: other.book_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            isbn: other.isbn.to_string(),
            published_year: other.published_year,
            quantity: other.quantity,
            book_status: other.book_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::dto::BookDto;
    use crate::core::library::BookStatus;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookDto::new("isbn", "title", "author", 1999, 3);
        assert_eq!("isbn", book.isbn.as_str());
        assert_eq!("author", book.author.as_str());
        assert_eq!(BookStatus::Available, book.book_status);
    }

    #[tokio::test]
    async fn test_should_serialize_status_lowercase() {
        let book = BookDto::new("isbn", "title", "author", 1999, 0);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!("borrowed", json["book_status"].as_str().unwrap());
    }
}
