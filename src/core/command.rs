use async_trait::async_trait;
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Unavailable {
        message: String,
    },
    DuplicateLoan {
        message: String,
    },
    LoanNotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

impl CommandError {
    // same stable codes as LibraryError::code
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Database { .. } => { "transaction_failure" }
            CommandError::DuplicateKey { .. } => { "duplicate_key" }
            CommandError::NotFound { .. } => { "not_found" }
            CommandError::Unavailable { .. } => { "unavailable" }
            CommandError::DuplicateLoan { .. } => { "duplicate_loan" }
            CommandError::LoanNotFound { .. } => { "loan_not_found" }
            CommandError::Runtime { .. } => { "runtime" }
            CommandError::Serialization { .. } => { "serialization" }
            CommandError::Validation { .. } => { "validation" }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::Database { message, .. } => { message }
            CommandError::DuplicateKey { message } => { message }
            CommandError::NotFound { message } => { message }
            CommandError::Unavailable { message } => { message }
            CommandError::DuplicateLoan { message } => { message }
            CommandError::LoanNotFound { message } => { message }
            CommandError::Runtime { message, .. } => { message }
            CommandError::Serialization { message } => { message }
            CommandError::Validation { message, .. } => { message }
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::Unavailable { message } => {
                CommandError::Unavailable { message }
            }
            LibraryError::DuplicateLoan { message } => {
                CommandError::DuplicateLoan { message }
            }
            LibraryError::LoanNotFound { message } => {
                CommandError::LoanNotFound { message }
            }
            LibraryError::DuplicateKey { message } => {
                CommandError::DuplicateKey { message }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::CommandError;
    use crate::core::library::LibraryError;

    #[tokio::test]
    async fn test_should_keep_codes_across_boundary() {
        let errors = vec![
            LibraryError::database("test", None, true),
            LibraryError::not_found("test"),
            LibraryError::unavailable("Book not available"),
            LibraryError::duplicate_loan("test"),
            LibraryError::loan_not_found("test"),
            LibraryError::duplicate_key("test"),
            LibraryError::validation("test", None),
            LibraryError::serialization("test"),
            LibraryError::runtime("test", None),
        ];
        for err in errors {
            let code = err.code();
            let cmd_err = CommandError::from(err);
            assert_eq!(code, cmd_err.code());
        }
    }

    #[tokio::test]
    async fn test_should_keep_message() {
        let err = CommandError::from(LibraryError::unavailable("Book not available"));
        assert!(matches!(err, CommandError::Unavailable { .. }));
        assert_eq!("Book not available", err.message());
    }
}
