//! Webhook HTTP service layer for HookSign.
//!
//! This crate puts the signature protocol from `hooksign-auth` in front of a
//! business handler:
//!
//! - **Router**: maps the path to an authorization or adjustment endpoint
//! - **Service**: checks the signature headers, buffers the raw body up to a
//!   limit, verifies the request, dispatches it, signs the reply and writes the
//!   signature headers ahead of the body
//! - **Handler trait**: the boundary between HTTP and business logic
//! - **Response helpers**: uniform error responses and signed reply assembly

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::HookResponseBody;
pub use dispatch::{WebhookError, WebhookHandler, WebhookReply};
pub use router::WebhookRoute;
pub use response::HealthStatus;
pub use service::{DEFAULT_MAX_BODY_BYTES, HookHttpConfig, HookHttpService};
