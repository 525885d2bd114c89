//! Webhook HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use tracing::{debug, error, warn};

use hooksign_auth::signature::parse_signature_header;
use hooksign_auth::{AuthError, KeyResolver, SignedRequestHeaders, VerifyOptions};

use crate::body::HookResponseBody;
use crate::dispatch::{WebhookHandler, dispatch_webhook};
use crate::response::{
    health, internal_error, method_not_allowed, not_found, payload_too_large, reply_bytes,
    signed_response, unauthorized,
};
use crate::router::{Route, RouteError, WebhookRoute, resolve_route};

/// Version reported by the health probe.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default cap on buffered request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for the webhook HTTP service.
#[derive(Clone)]
pub struct HookHttpConfig {
    /// Resolver consulted for both verification and signing.
    pub key_resolver: Arc<dyn KeyResolver>,
    /// Request verification tunables.
    pub verify_options: VerifyOptions,
    /// Largest request body that is buffered for verification.
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for HookHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookHttpConfig")
            .field("key_resolver", &"...")
            .field("verify_options", &self.verify_options)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl HookHttpConfig {
    /// Create a configuration with default verification options and body limit.
    pub fn new(key_resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            key_resolver,
            verify_options: VerifyOptions::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Hyper `Service` that authenticates webhook requests and signs the replies.
///
/// Wraps a [`WebhookHandler`]; the handler only ever sees verified requests.
#[derive(Debug)]
pub struct HookHttpService<H: WebhookHandler> {
    handler: Arc<H>,
    config: Arc<HookHttpConfig>,
}

impl<H: WebhookHandler> HookHttpService<H> {
    /// Create a new `HookHttpService`.
    pub fn new(handler: Arc<H>, config: HookHttpConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }
}

impl<H: WebhookHandler> Clone for HookHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: WebhookHandler> hyper::service::Service<http::Request<Incoming>> for HookHttpService<H> {
    type Response = http::Response<HookResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = process_request(req, handler.as_ref(), &config, &request_id).await;
            let response = add_common_headers(response, &request_id);
            Ok(response)
        })
    }
}

/// Process a single webhook request through the full pipeline.
async fn process_request<H: WebhookHandler>(
    req: http::Request<Incoming>,
    handler: &H,
    config: &HookHttpConfig,
    request_id: &str,
) -> http::Response<HookResponseBody> {
    let (parts, incoming) = req.into_parts();

    // 1. Route.
    let route = match resolve_route(&parts.method, parts.uri.path()) {
        Ok(Route::Webhook(route)) => route,
        Ok(Route::Health) => return health(VERSION),
        Err(RouteError::NotFound) => return not_found(),
        Err(RouteError::MethodNotAllowed) => return method_not_allowed(),
    };

    // 2. Header presence and algorithm tag, before a single body byte is read.
    let headers = match SignedRequestHeaders::from_header_map(&parts.headers).and_then(|headers| {
        parse_signature_header(&headers.signature)?;
        Ok(headers)
    }) {
        Ok(headers) => headers,
        Err(auth_err) => return reject(request_id, route, &auth_err),
    };

    // 3. Buffer the raw body, bounded, before anything looks at it.
    let body = match collect_body(incoming, config.max_body_bytes).await {
        Ok(body) => body,
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(request_id, route = %route, limit = config.max_body_bytes, "request body too large");
            return payload_too_large();
        }
        Err(e) => {
            warn!(request_id, route = %route, error = %e, "failed to read request body");
            return unauthorized();
        }
    };

    // 4. Authenticate.
    let verified = match hooksign_auth::verify_request(
        &headers,
        &body,
        config.key_resolver.as_ref(),
        &config.verify_options,
    ) {
        Ok(verified) => verified,
        Err(auth_err) => return reject(request_id, route, &auth_err),
    };

    let endpoint = verified.endpoint.clone();
    let key_id = verified.key_id.clone();

    // 5. Dispatch to handler.
    let reply = match dispatch_webhook(handler, route, verified, body).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(request_id, route = %route, error = %e, "webhook handler failed");
            return internal_error();
        }
    };

    // 6. Sign, then attach headers and body together.
    let signature = match hooksign_auth::sign_response(
        reply_bytes(&reply),
        &endpoint,
        &key_id,
        config.key_resolver.as_ref(),
    ) {
        Ok(signature) => signature,
        Err(e) => {
            error!(request_id, route = %route, error = %e, "failed to sign webhook response");
            return internal_error();
        }
    };

    match signed_response(reply, &signature) {
        Ok(response) => {
            debug!(request_id, route = %route, "sent signed webhook response");
            response
        }
        Err(e) => {
            error!(request_id, route = %route, error = %e, "failed to attach signature headers");
            internal_error()
        }
    }
}

/// Map a failed authentication step to a response.
///
/// Rejections all look the same to the caller; the reason is only logged.
fn reject(
    request_id: &str,
    route: WebhookRoute,
    auth_err: &AuthError,
) -> http::Response<HookResponseBody> {
    if auth_err.is_rejection() {
        warn!(request_id, route = %route, reason = %auth_err, "rejected webhook request");
        unauthorized()
    } else {
        error!(request_id, route = %route, error = %auth_err, "webhook authentication failed");
        internal_error()
    }
}

/// Collect the incoming body into a single `Bytes` buffer, reading at most
/// `limit` bytes.
///
/// A body that cannot be read in full is an error; partial bodies are never
/// returned.
async fn collect_body(incoming: Incoming, limit: usize) -> Result<Bytes, BoxError> {
    Limited::new(incoming, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
}

/// Add common response headers to every webhook response.
fn add_common_headers(
    mut response: http::Response<HookResponseBody>,
    request_id: &str,
) -> http::Response<HookResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-request-id").or_insert(hv);
    }

    headers.insert("server", http::HeaderValue::from_static("hooksign"));

    response
}
