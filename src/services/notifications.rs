//! Notification center
//!
//! Delivery and polling cadence belong to the caller; the core only exposes
//! the unread count and an idempotent mark-read.

use std::sync::Arc;

use crate::backend::PlacementBackend;
use crate::error::{PortalError, Result};
use crate::models::NotificationFeed;
use crate::services::session::SessionManager;

/// Notification service
pub struct NotificationCenter {
    backend: Arc<dyn PlacementBackend>,
    sessions: Arc<SessionManager>,
}

impl NotificationCenter {
    pub fn new(backend: Arc<dyn PlacementBackend>, sessions: Arc<SessionManager>) -> Self {
        Self { backend, sessions }
    }

    /// Latest notifications, newest first
    pub async fn feed(&self) -> Result<NotificationFeed> {
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.notifications(s.token()).await })
            .await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        Ok(self.feed().await?.unread_count)
    }

    /// Mark a notification read; marking it twice is not an error
    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        let backend = self.backend.clone();
        let id = notification_id.to_string();
        match self
            .sessions
            .authorized(|s| async move { backend.mark_notification_read(s.token(), &id).await })
            .await
        {
            Err(PortalError::Conflict(_)) => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::models::{AccountStatus, Drive, Role};
    use crate::store::MemoryCredentialStore;

    #[tokio::test]
    async fn test_unread_count_and_mark_read() {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .add_account("Sam", "sam@campus.edu", "secret1", Role::Student, AccountStatus::Active)
            .await
            .unwrap();
        backend
            .add_drive(Drive {
                id: "d1".to_string(),
                company_name: "Globex".to_string(),
                job_role: "SDE".to_string(),
                min_gpa: 0.0,
                allowed_backlogs: 0,
                required_skills: Vec::new(),
                drive_date: "2026-12-01".to_string(),
                recruiter_id: None,
                already_applied: false,
                recommendation_score: None,
            })
            .await;

        let sessions = Arc::new(SessionManager::new(
            backend.clone(),
            Arc::new(MemoryCredentialStore::new()),
        ));
        let session = sessions.login("sam@campus.edu", "secret1").await.unwrap();
        backend.apply(session.token(), "d1").await.unwrap();

        let center = NotificationCenter::new(backend.clone(), sessions);
        assert_eq!(center.unread_count().await.unwrap(), 1);

        let feed = center.feed().await.unwrap();
        assert!(feed.notifications[0].message.contains("Globex"));
        let id = feed.notifications[0].id.clone();
        center.mark_read(&id).await.unwrap();
        center.mark_read(&id).await.unwrap();
        assert_eq!(center.unread_count().await.unwrap(), 0);

        assert!(matches!(
            center.mark_read("missing").await.unwrap_err(),
            PortalError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_requires_session() {
        let backend = Arc::new(InMemoryBackend::new());
        let sessions = Arc::new(SessionManager::new(
            backend.clone(),
            Arc::new(MemoryCredentialStore::new()),
        ));
        let center = NotificationCenter::new(backend, sessions);
        assert!(matches!(
            center.unread_count().await.unwrap_err(),
            PortalError::NotAuthenticated
        ));
    }
}
