//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. Trailing-slash normalization
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//!
//! Authentication is an extractor, not a layer, so public and protected
//! routes share one router.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
