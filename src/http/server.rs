//! HTTP server setup and per-request orchestration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request timeout)
//! - Consult the firewall before every forward
//! - Forward allowed requests upstream and relay the response
//!
//! Per-request flow: receive → select urldb backend by URL hash → lookup →
//! forward on Safe, 403 on Blocked, 500 on any lookup or upstream failure.
//! Exactly one response is written per inbound request.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{header, request, Request, Response, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::{Backend, ProxyConfig};
use crate::firewall::{select_backend, FirewallClient, OutboundClient, Verdict};
use crate::http::rewrite::{append_forwarded_for, copy_headers, join_path, strip_hop_by_hop};

/// Application state injected into the handler.
///
/// Everything here is read-only after startup; requests share it without
/// locking.
#[derive(Clone)]
pub struct AppState<C: OutboundClient> {
    pub backends: Arc<Vec<Backend>>,
    pub firewall: FirewallClient<C>,
    pub client: C,
}

/// HTTP server for the forward proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and outbound
    /// client. The same client serves both lookups and forwards; tests pass
    /// a double here.
    pub fn new<C: OutboundClient>(config: ProxyConfig, client: C) -> Self {
        let state = AppState {
            backends: Arc::new(config.urldb.clone()),
            firewall: FirewallClient::new(
                client.clone(),
                Duration::from_secs(config.timeouts.lookup_secs),
            ),
            client,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<C: OutboundClient>(config: &ProxyConfig, state: AppState<C>) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler::<C>))
            .route("/", any(proxy_handler::<C>))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.config.urldb.len(),
            "Proxy server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Proxy server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
///
/// Consults the urldb shard responsible for the request URL, then either
/// relays the request upstream or answers directly.
async fn proxy_handler<C: OutboundClient>(
    State(state): State<AppState<C>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    tracing::debug!(
        method = %request.method(),
        remote = %addr,
        uri = %request.uri(),
        "Received request"
    );

    let host = request_host(&request);
    let lookup_path = join_path(&host, request.uri().path());
    let backend = select_backend(&lookup_path, &state.backends);

    let verdict = match state.firewall.check_url(backend, &lookup_path).await {
        Ok(verdict) => verdict,
        Err(error) => {
            tracing::error!(
                backend = %backend.endpoint,
                url = %lookup_path,
                %error,
                "URL database lookup failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to look up URL database.",
            )
                .into_response();
        }
    };

    match verdict {
        Verdict::Blocked => {
            tracing::warn!(url = %lookup_path, "Dropping client request, URL database says blocked");
            (StatusCode::FORBIDDEN, "Firewall blocked the request.").into_response()
        }
        Verdict::Safe => forward(&state, addr, request).await,
    }
}

/// Forward the original request upstream and relay the response.
async fn forward<C: OutboundClient>(
    state: &AppState<C>,
    addr: SocketAddr,
    request: Request<Body>,
) -> Response<Body> {
    let (mut parts, body) = request.into_parts();

    // Rebuild an absolute URI for the outbound call; a request parsed from
    // the wire in origin-form has no authority of its own.
    let uri = match absolute_uri(&parts) {
        Some(uri) => uri,
        None => {
            tracing::error!(uri = %parts.uri, "Cannot determine upstream target");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to reach upstream.")
                .into_response();
        }
    };
    parts.uri = uri;

    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, addr.ip());

    let outbound = Request::from_parts(parts, body);
    tracing::debug!(uri = %outbound.uri(), "Forwarding upstream");

    match state.client.request(outbound).await {
        Ok(upstream) => {
            let (mut upstream_parts, upstream_body) = upstream.into_parts();
            tracing::debug!(remote = %addr, status = %upstream_parts.status, "Upstream responded");

            strip_hop_by_hop(&mut upstream_parts.headers);

            let mut response = Response::new(upstream_body);
            *response.status_mut() = upstream_parts.status;
            copy_headers(response.headers_mut(), &upstream_parts.headers);
            response
        }
        Err(error) => {
            tracing::error!(%error, "Upstream request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to reach upstream.").into_response()
        }
    }
}

/// Host (with port, when present) of the inbound request: the URI authority
/// for absolute-form requests, falling back to the Host header.
fn request_host(request: &Request<Body>) -> String {
    request
        .uri()
        .authority()
        .map(|a| a.to_string())
        .or_else(|| {
            request
                .headers()
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

/// Promote the request URI to absolute form, filling in the authority from
/// the Host header and defaulting the scheme to http.
fn absolute_uri(parts: &request::Parts) -> Option<Uri> {
    let mut uri_parts = parts.uri.clone().into_parts();

    if uri_parts.authority.is_none() {
        let host = parts.headers.get(header::HOST)?.to_str().ok()?;
        uri_parts.authority = Some(Authority::from_str(host).ok()?);
    }
    if uri_parts.scheme.is_none() {
        uri_parts.scheme = Some(Scheme::HTTP);
    }
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    Uri::from_parts(uri_parts).ok()
}
