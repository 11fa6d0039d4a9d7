use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::core::domain::Identifiable;
use crate::core::library::Role;
use crate::patrons::Patron;
use crate::utils::date::serializer;

// PatronEntity is a registered user allowed to borrow books.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct PatronEntity {
    #[sqlx(rename = "id")]
    pub patron_id: i64,
    pub username: String,
    pub role: Role,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl PatronEntity {
    pub fn new(username: &str, role: Role) -> Self {
        Self {
            patron_id: 0,
            username: username.to_string(),
            role,
            created_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for PatronEntity {
    fn id(&self) -> i64 {
        self.patron_id
    }

    fn version(&self) -> i64 {
        0
    }
}

impl Patron for PatronEntity {
    fn role(&self) -> Role {
        self.role
    }
}
