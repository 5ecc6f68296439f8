//! HTTP backend
//!
//! Talks to the placement REST API. Responses are JSON envelopes of the form
//! `{success: true, ...payload}` or `{success: false, error: "..."}`.
//!
//! Status mapping:
//! - no response (connect failure, timeout) -> `Network`
//! - 400 / 422 -> `Validation`
//! - 401 -> `SessionExpired` (except on login, where it means bad credentials)
//! - 403 -> `Forbidden`
//! - 404 -> `NotFound`
//! - 409 -> `Conflict`
//! - anything else unsuccessful -> `Backend`

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use super::{LoginGrant, PlacementBackend};
use crate::config::ApiConfig;
use crate::error::{PortalError, Result};
use crate::models::{
    AccountStatus, Application, Drive, Interview, InterviewRequest, NotificationFeed, PendingStudent,
    PlacementStatus, RegisterInput, User,
};

/// Placement API client over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the configured API
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the status with the parsed body
    async fn send_raw(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!("{} {} failed without response: {}", method, path, e);
            PortalError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortalError::Network(format!("Failed to read response body: {}", e)))?;

        // Non-JSON bodies (proxy error pages) are kept as the error text
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "error": text }))
        };

        tracing::debug!("{} {} -> {}", method, path, status);
        Ok((status, body))
    }

    /// Send a request and classify any failure
    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value> {
        let (status, body) = self.send_raw(method, path, token, body).await?;
        if !status.is_success() {
            return Err(classify(status, &body));
        }
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(PortalError::Backend {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| "Request failed".to_string()),
            });
        }
        Ok(body)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, token: &str, key: &str) -> Result<Vec<T>> {
        let body = self.send(Method::GET, path, Some(token), None).await?;
        optional_field(&body, key).map(Option::unwrap_or_default)
    }
}

/// Extract the error text from an envelope
fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Map an unsuccessful HTTP status to the error taxonomy
fn classify(status: StatusCode, body: &Value) -> PortalError {
    let message = error_message(body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => PortalError::Validation(message),
        StatusCode::UNAUTHORIZED => PortalError::SessionExpired,
        StatusCode::FORBIDDEN => PortalError::Forbidden(message),
        StatusCode::NOT_FOUND => PortalError::NotFound(message),
        StatusCode::CONFLICT => PortalError::Conflict(message),
        _ => PortalError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

/// Work out why a login was refused.
///
/// Backends report a blocked account either through a `status` field or only
/// in the error text, so both are checked.
fn login_refusal(status: StatusCode, body: &Value) -> PortalError {
    let hinted = body
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<AccountStatus>().ok());
    match hinted {
        Some(AccountStatus::PendingApproval) => return PortalError::AccountPending,
        Some(AccountStatus::Rejected) => return PortalError::AccountRejected,
        _ => {}
    }

    let message = error_message(body).unwrap_or_default();
    let lowered = message.to_lowercase();
    if lowered.contains("pending") {
        return PortalError::AccountPending;
    }
    if lowered.contains("rejected") {
        return PortalError::AccountRejected;
    }

    if status.is_server_error() {
        return PortalError::Backend {
            status: status.as_u16(),
            message,
        };
    }
    PortalError::InvalidCredentials
}

fn optional_field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Option<T>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Malformed '{}' in response: {}", key, e).into()),
    }
}

fn required_field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T> {
    optional_field(body, key)?
        .ok_or_else(|| anyhow::anyhow!("Response is missing '{}'", key).into())
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_string)
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl PlacementBackend for HttpBackend {
    async fn register(&self, input: &RegisterInput) -> Result<Option<String>> {
        let body = serde_json::to_value(input)
            .map_err(|e| anyhow::anyhow!("Failed to encode registration: {}", e))?;
        let response = self.send(Method::POST, "/auth/register", None, Some(body)).await?;
        Ok(message_of(&response))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant> {
        let (status, body) = self
            .send_raw(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        let succeeded = status.is_success() && body.get("success").and_then(Value::as_bool) != Some(false);
        if !succeeded {
            return Err(login_refusal(status, &body));
        }

        Ok(LoginGrant {
            token: required_field(&body, "token")?,
            user: required_field(&body, "user")?,
        })
    }

    async fn me(&self, token: &str) -> Result<User> {
        let body = self.send(Method::GET, "/auth/me", Some(token), None).await?;
        required_field(&body, "user")
    }

    async fn logout(&self, token: &str) -> Result<()> {
        self.send(Method::POST, "/auth/logout", Some(token), None).await?;
        Ok(())
    }

    async fn pending_students(&self, token: &str) -> Result<Vec<PendingStudent>> {
        self.get_list("/tpo/pending-students", token, "students").await
    }

    async fn approve_student(&self, token: &str, student_id: &str) -> Result<Option<String>> {
        let path = format!("/tpo/students/{}/approve", segment(student_id));
        let body = self.send(Method::PUT, &path, Some(token), None).await?;
        Ok(message_of(&body))
    }

    async fn reject_student(&self, token: &str, student_id: &str) -> Result<Option<String>> {
        let path = format!("/tpo/students/{}/reject", segment(student_id));
        let body = self.send(Method::PUT, &path, Some(token), None).await?;
        Ok(message_of(&body))
    }

    async fn eligible_drives(&self, token: &str) -> Result<Vec<Drive>> {
        self.get_list("/students/eligible-drives", token, "drives").await
    }

    async fn recommended_drives(&self, token: &str) -> Result<Vec<Drive>> {
        self.get_list("/students/recommended-drives", token, "drives").await
    }

    async fn apply(&self, token: &str, drive_id: &str) -> Result<Option<String>> {
        let body = self
            .send(
                Method::POST,
                "/students/apply",
                Some(token),
                Some(json!({ "company_id": drive_id })),
            )
            .await?;
        Ok(message_of(&body))
    }

    async fn student_applications(&self, token: &str) -> Result<Vec<Application>> {
        self.get_list("/students/applications", token, "applications").await
    }

    async fn drive_applications(&self, token: &str, drive_id: &str) -> Result<Vec<Application>> {
        let path = format!("/companies/{}/applications", segment(drive_id));
        self.get_list(&path, token, "applications").await
    }

    async fn all_applications(&self, token: &str) -> Result<Vec<Application>> {
        self.get_list("/applications", token, "applications").await
    }

    async fn update_application_status(
        &self,
        token: &str,
        application_id: &str,
        _from: PlacementStatus,
        status: PlacementStatus,
    ) -> Result<()> {
        // The API checks against its own copy; stale requests come back as refusals
        let path = format!("/applications/{}/status", segment(application_id));
        self.send(Method::PUT, &path, Some(token), Some(json!({ "status": status })))
            .await?;
        Ok(())
    }

    async fn schedule_interview(&self, token: &str, request: &InterviewRequest) -> Result<String> {
        let body = serde_json::to_value(request)
            .map_err(|e| anyhow::anyhow!("Failed to encode interview: {}", e))?;
        let response = self.send(Method::POST, "/interviews", Some(token), Some(body)).await?;
        required_field(&response, "id")
    }

    async fn my_interviews(&self, token: &str) -> Result<Vec<Interview>> {
        self.get_list("/interviews/me", token, "interviews").await
    }

    async fn notifications(&self, token: &str) -> Result<NotificationFeed> {
        let body = self.send(Method::GET, "/notifications", Some(token), None).await?;
        Ok(NotificationFeed {
            notifications: optional_field(&body, "notifications")?.unwrap_or_default(),
            unread_count: optional_field(&body, "unread_count")?.unwrap_or_default(),
        })
    }

    async fn mark_notification_read(&self, token: &str, notification_id: &str) -> Result<()> {
        let path = format!("/notifications/{}/read", segment(notification_id));
        self.send(Method::PUT, &path, Some(token), None).await?;
        Ok(())
    }
}
