//! urldb lookup client.
//!
//! # Responsibilities
//! - Build the lookup URL for a chosen backend
//! - Issue the GET with a bounded timeout
//! - Classify failures (unreachable, rejected, unreadable body)
//! - Derive the verdict from the raw response body
//!
//! # Design Decisions
//! - The outbound transport sits behind the `OutboundClient` trait so tests
//!   can substitute a double at construction time
//! - "SAFE" is matched byte-for-byte; anything else is a Blocked verdict

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::schema::Backend;
use crate::http::rewrite::join_path;

/// Boxed transport error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Largest urldb response body we will read. Verdicts are a single word;
/// a body exceeding this fails the read and the lookup.
const MAX_VERDICT_BYTES: usize = 64 * 1024;

/// Classification of a single URL by the firewall service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The urldb answered exactly "SAFE".
    Safe,
    /// Any other answer, including an empty body.
    Blocked,
}

impl Verdict {
    /// Derive the verdict from the raw response body. Exact, case-sensitive
    /// equality against "SAFE"; no trimming, no substring matching.
    pub fn from_body(body: &[u8]) -> Self {
        if body == b"SAFE" {
            Verdict::Safe
        } else {
            Verdict::Blocked
        }
    }
}

/// Why a urldb lookup failed. All variants surface to the client as a
/// generic 500; the detail is logged only.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport-level failure reaching the backend (includes timeout).
    #[error("urldb backend unreachable: {0}")]
    Unavailable(#[source] BoxError),

    /// The backend itself reported a malformed or internal-error condition.
    #[error("urldb backend rejected the lookup with status {0}")]
    Rejected(StatusCode),

    /// The response arrived but its body could not be read.
    #[error("failed to read urldb response body: {0}")]
    ReadFailed(#[source] axum::Error),

    /// The lookup URI could not be built from the backend's endpoint and
    /// prefix. A local construction error, not a transport failure.
    #[error("invalid lookup URI: {0}")]
    InvalidUri(#[source] axum::http::uri::InvalidUri),
}

/// Outbound HTTP capability used for both the lookup and the forward.
///
/// The production implementation is [`HyperClient`]; tests substitute a
/// canned double.
pub trait OutboundClient: Clone + Send + Sync + 'static {
    /// Issue an arbitrary request, preserving method and body.
    fn request(
        &self,
        req: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, BoxError>> + Send;

    /// Issue a plain GET.
    fn get(&self, uri: Uri) -> impl Future<Output = Result<Response<Body>, BoxError>> + Send;
}

/// Transport-backed [`OutboundClient`] over the hyper legacy client.
#[derive(Clone)]
pub struct HyperClient {
    inner: Client<HttpConnector, Body>,
}

impl HyperClient {
    pub fn new() -> Self {
        Self {
            inner: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundClient for HyperClient {
    async fn request(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let response = self.inner.request(req).await?;
        Ok(response.map(Body::new))
    }

    async fn get(&self, uri: Uri) -> Result<Response<Body>, BoxError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())?;
        self.request(req).await
    }
}

/// Client for the urldb consultation protocol.
#[derive(Clone)]
pub struct FirewallClient<C> {
    client: C,
    timeout: Duration,
}

impl<C: OutboundClient> FirewallClient<C> {
    pub fn new(client: C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Ask `backend` to classify `url_path`.
    ///
    /// `url_path` is the slash-joined host+path of the original request; it
    /// is appended to the backend's endpoint and prefix with exactly one
    /// slash at each boundary.
    pub async fn check_url(
        &self,
        backend: &Backend,
        url_path: &str,
    ) -> Result<Verdict, LookupError> {
        let uri = lookup_uri(backend, url_path)?;

        // The timeout bounds the whole exchange: a backend that sends its
        // headers promptly and then stalls the body must not hold the
        // worker, and a late verdict must not be honored.
        let exchange = async {
            let response = self.client.get(uri).await.map_err(LookupError::Unavailable)?;

            let status = response.status();
            if status == StatusCode::BAD_REQUEST || status == StatusCode::INTERNAL_SERVER_ERROR {
                return Err(LookupError::Rejected(status));
            }

            axum::body::to_bytes(response.into_body(), MAX_VERDICT_BYTES)
                .await
                .map_err(LookupError::ReadFailed)
        };

        let body = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|elapsed| LookupError::Unavailable(Box::new(elapsed)))??;

        Ok(Verdict::from_body(&body))
    }
}

/// Build the lookup URI: endpoint + prefix + url_path, slash-joined, with a
/// single trailing slash dropped (the urldb keys carry none).
fn lookup_uri(backend: &Backend, url_path: &str) -> Result<Uri, LookupError> {
    let base = format!("{}{}", backend.endpoint, backend.prefix);
    let joined = join_path(&base, url_path);
    let trimmed = joined.strip_suffix('/').unwrap_or(&joined);

    Uri::from_str(&format!("http://{}", trimmed)).map_err(LookupError::InvalidUri)
}
