use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Router;
use std::net::SocketAddr;
use serde::{Deserialize, Serialize};
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::store::Store;

// header carrying the borrower id asserted by the upstream authentication layer
pub(crate) const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) config: Configuration,
    pub(crate) store: Store,
}

impl AppState {
    pub fn new(config: Configuration, store: Store) -> AppState {
        AppState {
            config,
            store,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ErrorResponse {
    pub code: String,
    pub error: String,
}

pub(crate) type ServerError = (StatusCode, Json<ErrorResponse>);

fn server_error(status: StatusCode, code: &str, message: &str) -> ServerError {
    (status, Json(ErrorResponse { code: code.to_string(), error: message.to_string() }))
}

pub(crate) fn json_to_server_error(err: serde_json::Error) -> ServerError {
    server_error(StatusCode::BAD_REQUEST, "serialization", format!("{}", err).as_str())
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::Database { retryable, .. } => {
                if retryable { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::INTERNAL_SERVER_ERROR }
            }
            CommandError::DuplicateKey { .. } => { StatusCode::CONFLICT }
            CommandError::NotFound { .. } => { StatusCode::NOT_FOUND }
            CommandError::Unavailable { .. } => { StatusCode::CONFLICT }
            CommandError::DuplicateLoan { .. } => { StatusCode::CONFLICT }
            CommandError::LoanNotFound { .. } => { StatusCode::NOT_FOUND }
            CommandError::Runtime { .. } => { StatusCode::INTERNAL_SERVER_ERROR }
            CommandError::Serialization { .. } => { StatusCode::BAD_REQUEST }
            CommandError::Validation { .. } => { StatusCode::BAD_REQUEST }
        };
        if status.is_server_error() {
            tracing::error!(error = ?err, "command failed");
        }
        server_error(status, err.code(), err.message())
    }
}

// BorrowerId is the authenticated caller, trusted as-is
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BorrowerId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BorrowerId {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.headers.get(USER_ID_HEADER)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.trim().parse::<i64>().ok())
            .map(BorrowerId)
            .ok_or_else(|| server_error(StatusCode::UNAUTHORIZED, "unauthorized",
                                        "missing or invalid x-user-id header"))
    }
}

// Serves the router on `listen_addr` until ctrl-c.
pub(crate) async fn serve(app: Router, listen_addr: &str) -> LibraryResult<()> {
    let addr: SocketAddr = listen_addr.parse().map_err(|_| LibraryError::validation(
        format!("invalid listen address {}", listen_addr).as_str(), Some("listen_addr".to_string())))?;
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await
        .map_err(|err| LibraryError::runtime(format!("server error {}", err).as_str(), None))
}
