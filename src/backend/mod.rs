//! Placement backend
//!
//! The REST API the core talks to, expressed as a trait so the session
//! manager and the workflows do not care how calls travel:
//! - `HttpBackend` - the real API over HTTP (reqwest)
//! - `InMemoryBackend` - a self-contained implementation enforcing the same
//!   rules server-side, used by tests and demos
//!
//! Every authenticated call takes the bearer token explicitly. A rejected
//! token surfaces as `PortalError::SessionExpired`; the session manager
//! turns that into a global logout.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::models::{
    Application, Drive, Interview, InterviewRequest, NotificationFeed, PendingStudent, PlacementStatus,
    RegisterInput, User,
};

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

/// Successful login response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    pub user: User,
}

/// Placement API surface consumed by the core
#[async_trait]
pub trait PlacementBackend: Send + Sync {
    /// `POST /auth/register` - returns the server's message
    async fn register(&self, input: &RegisterInput) -> Result<Option<String>>;

    /// `POST /auth/login`
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant>;

    /// `GET /auth/me`
    async fn me(&self, token: &str) -> Result<User>;

    /// Server-side token invalidation, where supported
    async fn logout(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    /// `GET /tpo/pending-students`
    async fn pending_students(&self, token: &str) -> Result<Vec<PendingStudent>>;

    /// `PUT /tpo/students/{id}/approve`
    async fn approve_student(&self, token: &str, student_id: &str) -> Result<Option<String>>;

    /// `PUT /tpo/students/{id}/reject`
    async fn reject_student(&self, token: &str, student_id: &str) -> Result<Option<String>>;

    /// `GET /students/eligible-drives`
    async fn eligible_drives(&self, token: &str) -> Result<Vec<Drive>>;

    /// `GET /students/recommended-drives`
    async fn recommended_drives(&self, token: &str) -> Result<Vec<Drive>>;

    /// `POST /students/apply`
    async fn apply(&self, token: &str, drive_id: &str) -> Result<Option<String>>;

    /// `GET /students/applications`
    async fn student_applications(&self, token: &str) -> Result<Vec<Application>>;

    /// `GET /companies/{id}/applications`
    async fn drive_applications(&self, token: &str, drive_id: &str) -> Result<Vec<Application>>;

    /// `GET /applications`
    async fn all_applications(&self, token: &str) -> Result<Vec<Application>>;

    /// `PUT /applications/{id}/status`
    ///
    /// `from` is the status the caller last saw. A backend that still holds
    /// `from` reports a table violation as `InvalidTransition`; one that has
    /// moved on reports `Conflict`.
    async fn update_application_status(
        &self,
        token: &str,
        application_id: &str,
        from: PlacementStatus,
        status: PlacementStatus,
    ) -> Result<()>;

    /// `POST /interviews` - returns the new interview's id
    async fn schedule_interview(&self, token: &str, request: &InterviewRequest) -> Result<String>;

    /// `GET /interviews/me`
    async fn my_interviews(&self, token: &str) -> Result<Vec<Interview>>;

    /// `GET /notifications`
    async fn notifications(&self, token: &str) -> Result<NotificationFeed>;

    /// `PUT /notifications/{id}/read`
    async fn mark_notification_read(&self, token: &str, notification_id: &str) -> Result<()>;
}

/// Create the HTTP backend from configuration
pub fn create_backend(config: &ApiConfig) -> Result<Arc<dyn PlacementBackend>> {
    Ok(Arc::new(HttpBackend::new(config)?))
}
