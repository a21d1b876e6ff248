use crate::{ApiRequest, ApiResponse, ClientError, Transport};

/// Endpoint that trades the refresh cookie for a new access token
pub const REFRESH_PATH: &str = "/api/auth/refresh";

pub const DEFAULT_LOGIN_URL: &str = "/login";

/// Result of a request that went through the interceptor
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome<T = ApiResponse> {
    Response(T),
    /// The refresh failed; the user has to sign in again
    LoginRequired { login_url: String },
}

/// Wraps a transport with a single refresh-and-retry on 401.
///
/// On a 401 the interceptor calls the refresh endpoint once. If that succeeds
/// the original request is reissued once and its response returned as is,
/// even when it is another 401. If the refresh fails the caller gets
/// [`AuthOutcome::LoginRequired`].
pub struct AuthInterceptor<T> {
    transport: T,
    login_url: String,
}

impl<T: Transport> AuthInterceptor<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub async fn execute(&self, request: &ApiRequest) -> Result<AuthOutcome, ClientError> {
        let response = self.transport.send(request).await?;
        if !response.is_unauthorized() {
            return Ok(AuthOutcome::Response(response));
        }

        tracing::debug!(path = %request.path, "Access token rejected, refreshing");
        if !self.refresh().await {
            tracing::warn!(login_url = %self.login_url, "Token refresh failed, login required");
            return Ok(AuthOutcome::LoginRequired {
                login_url: self.login_url.clone(),
            });
        }

        let retried = self.transport.send(request).await?;
        tracing::debug!(path = %request.path, status = retried.status, "Retried after refresh");
        Ok(AuthOutcome::Response(retried))
    }

    async fn refresh(&self) -> bool {
        let request = ApiRequest::post(REFRESH_PATH, None);
        match self.transport.send(&request).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                tracing::error!(error = %e, "Error refreshing token");
                false
            }
        }
    }
}
