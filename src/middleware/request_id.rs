//! Request ids for the HTTP API
//!
//! An incoming `x-request-id` is kept; otherwise a UUID v4 is assigned. The
//! id is echoed on the response, recorded on the trace span and available to
//! handlers through the [`RequestId`] extractor.

use std::convert::Infallible;

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{request::Parts, Extensions, HeaderValue},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{self, MakeRequestId, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Assigns UUID v4 ids to requests that arrive without one
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<request_id::RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(request_id::RequestId::new)
    }
}

/// The id of the request being handled
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    fn from_extensions(extensions: &Extensions) -> Self {
        let id = extensions
            .get::<request_id::RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or(UNKNOWN_REQUEST_ID);
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}

/// Wraps `router` with id assignment, tracing and id propagation, in that
/// order from the outside in
pub fn with_request_ids(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}

/// Span for `TraceLayer`, tagged with the request ID
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = RequestId::from_extensions(request.extensions());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
