use crate::core::domain::Identifiable;
use crate::core::library::BookStatus;

pub mod model;

pub(crate) trait Book: Identifiable {
    fn quantity(&self) -> i64;
    fn status(&self) -> BookStatus;

    // a copy can be lent only while one is on hand and the status cache agrees
    fn is_lendable(&self) -> bool {
        self.quantity() > 0 && self.status() != BookStatus::Borrowed
    }

    // status = borrowed iff quantity = 0
    fn is_status_consistent(&self) -> bool {
        (self.status() == BookStatus::Borrowed) == (self.quantity() == 0)
    }
}
