//! HTTP surface of the URL-classification service.
//!
//! # Responsibilities
//! - Accept `GET <prefix><url>` and answer the stored label or "SAFE"
//! - Reject requests outside the configured prefix with 400
//! - Reject methods other than GET with 501
//!
//! The lookup key is everything after the prefix, query string included,
//! matching how the proxy builds its lookup URL.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, Response, StatusCode},
    response::IntoResponse,
    Router,
};

use crate::urldb::store::UrlStore;

/// Build the service router around an immutable store.
pub fn router(store: Arc<UrlStore>) -> Router {
    Router::new().fallback(classify).with_state(store)
}

async fn classify(State(store): State<Arc<UrlStore>>, request: Request<Body>) -> Response<Body> {
    tracing::debug!(method = %request.method(), uri = %request.uri(), "Got classification request");

    if request.method() != Method::GET {
        let message = format!("We do not handle HTTP method: {}", request.method());
        tracing::warn!("{}", message);
        return (StatusCode::NOT_IMPLEMENTED, message).into_response();
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("");

    match target.strip_prefix(store.prefix()) {
        Some(url) => {
            let label = store.classify(url);
            tracing::debug!(url, label, "Classified URL");
            (StatusCode::OK, label.to_string()).into_response()
        }
        None => {
            let message = format!(
                "Invalid request: {}, expecting prefix: {}",
                target,
                store.prefix()
            );
            tracing::warn!("{}", message);
            (StatusCode::BAD_REQUEST, message).into_response()
        }
    }
}
