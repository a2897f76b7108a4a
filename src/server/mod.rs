//! The HTTP API: four JSON endpoints over the transaction and budget services.
//!
//! Each connection is served on its own task. The services are cheap to clone and share one
//! `RowStore`, so the state is handed to every connection behind an `Arc`.

mod routes;

use crate::api::Sheet;
use crate::service::{BudgetService, TransactionService};
use crate::store::RowStore;
use crate::Result;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

pub use routes::{route, CATEGORIES_PATH, EXPENSES_PATH};

/// What every request handler needs.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub(crate) transactions: TransactionService,
    pub(crate) budgets: BudgetService,
}

impl ApiState {
    pub fn new(
        sheet: Arc<dyn Sheet>,
        transactions_range: impl Into<String>,
        categories_range: impl Into<String>,
    ) -> Self {
        let store = RowStore::new(sheet);
        Self {
            transactions: TransactionService::new(store.clone(), transactions_range),
            budgets: BudgetService::new(store, categories_range),
        }
    }
}

/// Accepts connections on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let state = Arc::new(state);
    info!("Listening on http://{}", listener.local_addr()?);
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Unable to accept a connection: {e}");
                        continue;
                    }
                };
                let state = state.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |request| {
                        let state = state.clone();
                        async move { handle(&state, request).await }
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!("Connection from {peer} closed with an error: {e}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle(
    state: &ApiState,
    request: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let (status, body) = match request.into_body().collect().await {
        Ok(collected) => route(state, &method, &path, &collected.to_bytes()).await,
        Err(e) => {
            error!("Unable to read the request body: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal Server Error" }),
            )
        }
    };
    debug!("{method} {path} -> {}", status.as_u16());
    Ok(json_response(status, &body))
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, CATEGORIES_RANGE, TRANSACTIONS_RANGE};
    use crate::client::ApiClient;
    use crate::model::{NewBudget, NewTransaction};
    use serde_json::json;

    /// Starts the API on an ephemeral port and returns a client pointed at it, plus the sender that
    /// stops the server.
    async fn start(sheet: Arc<TestSheet>) -> (ApiClient, tokio::sync::oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ApiState::new(sheet, TRANSACTIONS_RANGE, CATEGORIES_RANGE);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            serve(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });
        let client = ApiClient::new(&format!("http://{addr}")).unwrap();
        (client, tx)
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let sheet = Arc::new(TestSheet::default());
        let (client, stop) = start(sheet.clone()).await;

        assert_eq!(client.expenses().await.unwrap().len(), 13);
        assert_eq!(client.categories().await.unwrap().len(), 5);

        let input: NewTransaction = serde_json::from_value(json!({
            "amount": "42.5",
            "description": "Books",
            "category": "Personal",
            "type": "Debit",
            "date": "2024-06-29"
        }))
        .unwrap();
        let created = client.add_expense(&input).await.unwrap();
        assert_eq!(created.description(), "Books");
        assert_eq!(client.expenses().await.unwrap().len(), 14);

        let budget: NewBudget = serde_json::from_value(json!({
            "category": "Personal",
            "subCategory": "Books",
            "budget": 500
        }))
        .unwrap();
        client.add_category(&budget).await.unwrap();
        assert_eq!(client.categories().await.unwrap().len(), 6);

        let _ = stop.send(());
    }

    #[tokio::test]
    async fn test_end_to_end_errors() {
        let sheet = Arc::new(TestSheet::default());
        let (client, stop) = start(sheet.clone()).await;

        let err = client
            .add_expense(&NewTransaction::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing required fields"), "{err}");

        sheet.fail_appends(true);
        let err = client
            .add_category(&NewBudget::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to add category"), "{err}");

        let _ = stop.send(());
    }

    #[tokio::test]
    async fn test_response_headers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ApiState::new(
            Arc::new(TestSheet::default()),
            TRANSACTIONS_RANGE,
            CATEGORIES_RANGE,
        );
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(serve(listener, state, async {
            let _ = rx.await;
        }));

        let response = reqwest::get(format!("http://{addr}/nope")).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Not Found"}));
        let _ = tx.send(());
    }
}
