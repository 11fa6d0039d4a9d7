use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::Role;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::Patron;
use crate::utils::date::serializer;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PatronDto {
    pub patron_id: i64,
    pub username: String,
    pub role: Role,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl PatronDto {
    pub(crate) fn new(username: &str, role: Role) -> Self {
        PatronDto::from(&PatronEntity::new(username, role))
    }
}

impl Identifiable for PatronDto {
    fn id(&self) -> i64 {
        self.patron_id
    }

    fn version(&self) -> i64 {
        0
    }
}

impl Patron for PatronDto {
    fn role(&self) -> Role {
        self.role
    }
}

impl From<&PatronEntity> for PatronDto {
    fn from(other: &PatronEntity) -> Self {
        Self {
            patron_id: other.patron_id,
            username: other.username.to_string(),
            role: other.role,
            created_at: other.created_at,
        }
    }
}

impl From<&PatronDto> for PatronEntity {
    fn from(other: &PatronDto) -> Self {
        Self {
            patron_id: other.patron_id,
            username: other.username.to_string(),
            role: other.role,
            created_at: other.created_at,
        }
    }
}
