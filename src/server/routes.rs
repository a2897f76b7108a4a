use crate::model::{NewBudget, NewTransaction};
use crate::server::ApiState;
use crate::service::CreateError;
use hyper::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::error;

pub const EXPENSES_PATH: &str = "/api/expenses";
pub const CATEGORIES_PATH: &str = "/api/categories";

const EXPENSE_ADDED: &str = "Expense added successfully";
const CATEGORY_ADDED: &str = "Category added";
const FAILED_TO_ADD_EXPENSE: &str = "Failed to add expense";
const FAILED_TO_ADD_CATEGORY: &str = "Failed to add category";
const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
const NOT_FOUND: &str = "Not Found";
const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

/// Dispatches one request to its handler and returns the status and JSON body to send back.
pub async fn route(state: &ApiState, method: &Method, path: &str, body: &[u8]) -> (StatusCode, Value) {
    match (path, method) {
        (EXPENSES_PATH, &Method::GET) => list_expenses(state).await,
        (EXPENSES_PATH, &Method::POST) => create_expense(state, body).await,
        (CATEGORIES_PATH, &Method::GET) => list_categories(state).await,
        (CATEGORIES_PATH, &Method::POST) => create_category(state, body).await,
        (EXPENSES_PATH, _) | (CATEGORIES_PATH, _) => {
            error_body(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
        }
        _ => error_body(StatusCode::NOT_FOUND, NOT_FOUND),
    }
}

async fn list_expenses(state: &ApiState) -> (StatusCode, Value) {
    let transactions = state.transactions.list().await;
    to_json(&transactions)
}

async fn create_expense(state: &ApiState, body: &[u8]) -> (StatusCode, Value) {
    let input: NewTransaction = match parse_body(body) {
        Some(input) => input,
        None => return error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR),
    };
    match state.transactions.create(input).await {
        Ok(expense) => (
            StatusCode::OK,
            json!({ "message": EXPENSE_ADDED, "expense": expense }),
        ),
        Err(CreateError::Validation(message)) => error_body(StatusCode::BAD_REQUEST, message),
        Err(CreateError::Upstream) => {
            error_body(StatusCode::INTERNAL_SERVER_ERROR, FAILED_TO_ADD_EXPENSE)
        }
    }
}

async fn list_categories(state: &ApiState) -> (StatusCode, Value) {
    let budgets = state.budgets.list().await;
    to_json(&budgets)
}

async fn create_category(state: &ApiState, body: &[u8]) -> (StatusCode, Value) {
    let input: NewBudget = match parse_body(body) {
        Some(input) => input,
        None => return error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR),
    };
    if state.budgets.create(&input).await {
        (StatusCode::OK, json!({ "message": CATEGORY_ADDED }))
    } else {
        error_body(StatusCode::INTERNAL_SERVER_ERROR, FAILED_TO_ADD_CATEGORY)
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Unable to parse the request body: {e}");
            None
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> (StatusCode, Value) {
    match serde_json::to_value(value) {
        Ok(value) => (StatusCode::OK, value),
        Err(e) => {
            error!("Unable to serialize the response: {e}");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> (StatusCode, Value) {
    (status, json!({ "error": message }))
}
