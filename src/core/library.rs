use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

// SQLite primary result codes for lock contention, see https://www.sqlite.org/rescode.html
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Debug)]
pub enum LibraryError {
    // The store could not complete or commit a unit of work. Every partial write has been
    // rolled back; retrying is only safe when `retryable` is set.
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    NotFound {
        message: String,
    },
    // No copy of the book is free to lend.
    Unavailable {
        message: String,
    },
    DuplicateLoan {
        message: String,
    },
    LoanNotFound {
        message: String,
    },
    DuplicateKey {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str) -> LibraryError {
        LibraryError::Unavailable { message: message.to_string() }
    }

    pub fn duplicate_loan(message: &str) -> LibraryError {
        LibraryError::DuplicateLoan { message: message.to_string() }
    }

    pub fn loan_not_found(message: &str) -> LibraryError {
        LibraryError::LoanNotFound { message: message.to_string() }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    // stable outcome code that callers can match on without parsing the message
    pub fn code(&self) -> &'static str {
        match self {
            LibraryError::Database { .. } => { "transaction_failure" }
            LibraryError::NotFound { .. } => { "not_found" }
            LibraryError::Unavailable { .. } => { "unavailable" }
            LibraryError::DuplicateLoan { .. } => { "duplicate_loan" }
            LibraryError::LoanNotFound { .. } => { "loan_not_found" }
            LibraryError::DuplicateKey { .. } => { "duplicate_key" }
            LibraryError::Validation { .. } => { "validation" }
            LibraryError::Serialization { .. } => { "serialization" }
            LibraryError::Runtime { .. } => { "runtime" }
        }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::NotFound { .. } => { false }
            LibraryError::Unavailable { .. } => { false }
            LibraryError::DuplicateLoan { .. } => { false }
            LibraryError::LoanNotFound { .. } => { false }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                LibraryError::not_found("row not found")
            }
            sqlx::Error::PoolTimedOut => {
                LibraryError::database("timed out acquiring a store connection", Some("PoolTimedOut".to_string()), true)
            }
            sqlx::Error::Database(db_err) => {
                let reason = db_err.code().map(|c| c.to_string());
                if db_err.is_unique_violation() {
                    LibraryError::duplicate_key(format!("duplicate key {}", db_err.message()).as_str())
                } else if db_err.is_foreign_key_violation() {
                    LibraryError::validation(
                        format!("foreign key violation {}", db_err.message()).as_str(), reason)
                } else if db_err.is_check_violation() {
                    LibraryError::validation(
                        format!("check violation {}", db_err.message()).as_str(), reason)
                } else {
                    let retryable = is_lock_contention(reason.as_deref());
                    LibraryError::database(
                        format!("sqlite database error {}", db_err.message()).as_str(), reason, retryable)
                }
            }
            other => {
                LibraryError::database(format!("sqlite store error {:?}", other).as_str(), None, false)
            }
        }
    }
}

// extended result codes keep the primary code in the low byte
fn is_lock_contention(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| {
            let primary = c & 0xff;
            primary == SQLITE_BUSY || primary == SQLITE_LOCKED
        })
        .unwrap_or(false)
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Unavailable { message } => {
                write!(f, "{}", message)
            }
            LibraryError::DuplicateLoan { message } => {
                write!(f, "{}", message)
            }
            LibraryError::LoanNotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// A specialized Result type for the lending service.
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    // The page offset
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}


#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl BookStatus {
    // status is a cache of the quantity reaching zero
    pub fn for_quantity(quantity: i64) -> Self {
        if quantity == 0 {
            BookStatus::Borrowed
        } else {
            BookStatus::Available
        }
    }
}

impl From<String> for BookStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "borrowed" => BookStatus::Borrowed,
            _ => BookStatus::Available,
        }
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BookStatus::Available => write!(f, "available"),
            BookStatus::Borrowed => write!(f, "borrowed"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => Role::Admin,
            _ => Role::Member,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Member => write!(f, "member"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum CheckoutStatus {
    CheckedOut,
    Returned,
}

impl From<String> for CheckoutStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CheckedOut" => CheckoutStatus::CheckedOut,
            "Returned" => CheckoutStatus::Returned,
            _ => CheckoutStatus::CheckedOut,
        }
    }
}

impl Display for CheckoutStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CheckoutStatus::CheckedOut => write!(f, "CheckedOut"),
            CheckoutStatus::Returned => write!(f, "Returned"),
        }
    }
}
