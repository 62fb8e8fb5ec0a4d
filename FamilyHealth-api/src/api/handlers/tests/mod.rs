// Handler tests driven through the full router with `tower::ServiceExt::oneshot`

mod records_test;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use family_health_data::store::InMemoryTableClient;

use crate::api::create_app_with_client;
use crate::api::extract::USER_ID_HEADER;

/// Application over a fresh in-memory store
pub(crate) fn test_app() -> Router {
    create_app_with_client(Arc::new(InMemoryTableClient::new()))
}

/// Send one request and decode the JSON body (`Value::Null` when empty)
pub(crate) async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
