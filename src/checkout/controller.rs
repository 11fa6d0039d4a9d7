use std::collections::HashMap;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use crate::checkout::command::checkout_book_cmd::{CheckoutBookCommand, CheckoutBookCommandRequest, CheckoutBookCommandResponse};
use crate::checkout::command::overdue_books_cmd::{OverdueBooksCommand, OverdueBooksCommandRequest, OverdueBooksCommandResponse};
use crate::checkout::command::return_book_cmd::{ReturnBookCommand, ReturnBookCommandRequest, ReturnBookCommandResponse};
use crate::checkout::domain::CheckoutService;
use crate::checkout::factory;
use crate::core::command::Command;
use crate::core::controller::{self, AppState, BorrowerId, json_to_server_error, ServerError};
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;
use crate::core::store::Store;
use crate::patrons::controller::{add_patron, find_patron_by_id};

fn build_service(state: &AppState) -> Box<dyn CheckoutService> {
    factory::create_checkout_service(&state.config, &state.store)
}

pub(crate) async fn checkout_book(
    State(state): State<AppState>,
    BorrowerId(patron_id): BorrowerId,
    json: Json<Value>) -> Result<Json<CheckoutBookCommandResponse>, ServerError> {
    let mut req: CheckoutBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.patron_id = patron_id;
    let svc = build_service(&state);
    let res = CheckoutBookCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn return_book(
    State(state): State<AppState>,
    BorrowerId(patron_id): BorrowerId,
    json: Json<Value>) -> Result<Json<ReturnBookCommandResponse>, ServerError> {
    let mut req: ReturnBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.patron_id = patron_id;
    let svc = build_service(&state);
    let res = ReturnBookCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn overdue_books(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<OverdueBooksCommandResponse>, ServerError> {
    let req = OverdueBooksCommandRequest::from_params(&params)?;
    let svc = build_service(&state);
    let res = OverdueBooksCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/checkout", post(checkout_book))
        .route("/checkout/return", post(return_book))
        .route("/checkout/overdue", get(overdue_books))
        .route("/patrons", post(add_patron))
        .route("/patrons/:id", get(find_patron_by_id))
        .with_state(state)
}

pub async fn serve(config: Configuration, kind: RepositoryStore) -> LibraryResult<()> {
    let store = Store::connect(&config, kind).await?;
    let listen_addr = config.listen_addr.clone();
    let app = routes(AppState::new(config, store));
    controller::serve(app, listen_addr.as_str()).await
}
