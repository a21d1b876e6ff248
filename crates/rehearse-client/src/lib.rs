//! # rehearse-client
//!
//! Outbound HTTP for rehearse: a [`Transport`] seam, the [`AuthInterceptor`]
//! that recovers from one expired access token, and [`ApiClient`] for talking
//! to a running rehearse server.

mod api;
mod error;
mod interceptor;
mod transport;

pub use api::ApiClient;
pub use error::ClientError;
pub use interceptor::{AuthInterceptor, AuthOutcome, DEFAULT_LOGIN_URL, REFRESH_PATH};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
