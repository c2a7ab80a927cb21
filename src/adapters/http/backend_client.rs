//! reqwest implementation of the `AnswerService` and `DirectLine` ports.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::session::{ConversationStart, TokenGrant};
use crate::domain::{AcquisitionError, ActivitySet, OutgoingActivity};
use crate::ports::{AnswerService, DirectLine, DirectRequest};

/// HTTP client shared by every backend.
///
/// `request_timeout` bounds each Direct Line call; direct-response POSTs
/// carry their own timeout.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    request_timeout: Duration,
}

impl HttpBackendClient {
    pub fn new(request_timeout: Duration) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| {
                AcquisitionError::transport(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, AcquisitionError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AcquisitionError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        timeout: Duration,
        context: &'static str,
    ) -> Result<T, AcquisitionError> {
        let response = self.send(request, timeout).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        serde_json::from_slice(&bytes).map_err(|e| AcquisitionError::malformed(context, e))
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: Duration) -> AcquisitionError {
    if e.is_timeout() {
        AcquisitionError::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else if e.is_connect() {
        AcquisitionError::transport(format!("connection failed: {}", e))
    } else {
        AcquisitionError::transport(e.to_string())
    }
}

#[async_trait]
impl AnswerService for HttpBackendClient {
    async fn post(
        &self,
        url: &str,
        request: &DirectRequest,
        timeout: Duration,
    ) -> Result<serde_json::Value, AcquisitionError> {
        self.send_json(self.client.post(url).json(request), timeout, "direct")
            .await
    }
}

#[async_trait]
impl DirectLine for HttpBackendClient {
    async fn fetch_token(
        &self,
        token_url: &str,
        secret: &str,
    ) -> Result<TokenGrant, AcquisitionError> {
        let value: serde_json::Value = self
            .send_json(
                self.client.get(token_url).bearer_auth(secret),
                self.request_timeout,
                "token",
            )
            .await?;
        match value.get("token").and_then(|t| t.as_str()) {
            Some(token) => Ok(TokenGrant {
                token: token.to_string(),
            }),
            None => Err(AcquisitionError::missing("token", "token")),
        }
    }

    async fn start_conversation(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<ConversationStart, AcquisitionError> {
        let value: serde_json::Value = self
            .send_json(
                self.client.post(base_url).bearer_auth(token),
                self.request_timeout,
                "conversation",
            )
            .await?;
        if value.get("conversationId").and_then(|c| c.as_str()).is_none() {
            return Err(AcquisitionError::missing("conversation", "conversationId"));
        }
        serde_json::from_value(value).map_err(|e| AcquisitionError::malformed("conversation", e))
    }

    async fn post_activity(
        &self,
        activities_url: &str,
        token: &str,
        activity: &OutgoingActivity,
    ) -> Result<(), AcquisitionError> {
        self.send(
            self.client
                .post(activities_url)
                .bearer_auth(token)
                .json(activity),
            self.request_timeout,
        )
        .await
        .map(|_| ())
    }

    async fn list_activities(
        &self,
        activities_url: &str,
        token: &str,
    ) -> Result<ActivitySet, AcquisitionError> {
        self.send_json(
            self.client.get(activities_url).bearer_auth(token),
            self.request_timeout,
            "activities",
        )
        .await
    }
}
