use rehearse_persona::ClientProfile;
use serde::Deserialize;
use serde_json::json;

use crate::{ApiRequest, AuthInterceptor, AuthOutcome, ClientError, HttpTransport, Transport};

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a running rehearse server. Every call goes through the
/// [`AuthInterceptor`].
pub struct ApiClient<T = HttpTransport> {
    interceptor: AuthInterceptor<T>,
}

impl ApiClient<HttpTransport> {
    pub fn connect(base_url: &str, login_url: &str) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(base_url)?;
        Ok(Self::new(AuthInterceptor::new(transport).with_login_url(login_url)))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(interceptor: AuthInterceptor<T>) -> Self {
        Self { interceptor }
    }

    /// Ask the server's rule engine for the client's reply to `message`.
    pub async fn chat(
        &self,
        message: &str,
        profile: &ClientProfile,
    ) -> Result<AuthOutcome<String>, ClientError> {
        let request = ApiRequest::post(
            "/api/chat",
            Some(json!({ "message": message, "clientParams": profile })),
        );

        match self.interceptor.execute(&request).await? {
            AuthOutcome::Response(response) if response.is_success() => {
                let chat: ChatResponse = response.json()?;
                Ok(AuthOutcome::Response(chat.response))
            }
            AuthOutcome::Response(response) => {
                let message = response
                    .json::<ErrorBody>()
                    .map(|e| e.error)
                    .unwrap_or(response.body);
                Err(ClientError::Status {
                    status: response.status,
                    message,
                })
            }
            AuthOutcome::LoginRequired { login_url } => Ok(AuthOutcome::LoginRequired { login_url }),
        }
    }
}
