use crate::core::domain::Identifiable;
use crate::core::library::Role;

pub mod command;
pub mod controller;
pub mod domain;
pub mod dto;
pub mod factory;
pub mod repository;

pub(crate) trait Patron: Identifiable {
    fn role(&self) -> Role;

    fn is_admin(&self) -> bool {
        self.is_role(Role::Admin)
    }

    fn is_role(&self, match_role: Role) -> bool {
        self.role() == match_role
    }
}
