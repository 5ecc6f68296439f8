//! Account approval
//!
//! TPO decisions on self-registered student accounts. An account moves from
//! `pending_approval` to `active` or `rejected` exactly once; a second
//! decision on the same account fails with `AlreadyResolved` instead of
//! quietly succeeding.

use std::fmt;
use std::sync::Arc;

use crate::backend::PlacementBackend;
use crate::error::{PortalError, Result};
use crate::models::{PendingStudent, Role};
use crate::services::session::SessionManager;

/// TPO decision on a pending account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Reject => write!(f, "reject"),
        }
    }
}

/// Map a backend refusal onto `AlreadyResolved` where it means one
fn resolution_error(account_id: &str, err: PortalError) -> PortalError {
    let already = match &err {
        PortalError::Conflict(_) | PortalError::AlreadyResolved(_) => true,
        PortalError::Validation(msg) | PortalError::Backend { message: msg, .. } => {
            msg.to_lowercase().contains("already")
        }
        _ => false,
    };
    if already {
        PortalError::AlreadyResolved(account_id.to_string())
    } else {
        err
    }
}

/// Account approval service
pub struct AccountApproval {
    backend: Arc<dyn PlacementBackend>,
    sessions: Arc<SessionManager>,
}

impl AccountApproval {
    /// Create a new approval service
    pub fn new(backend: Arc<dyn PlacementBackend>, sessions: Arc<SessionManager>) -> Self {
        Self { backend, sessions }
    }

    fn ensure_tpo(&self) -> Result<()> {
        let session = self.sessions.current().ok_or(PortalError::NotAuthenticated)?;
        if session.role() != Role::Tpo {
            return Err(PortalError::Forbidden(
                "Only the placement officer can review registrations".to_string(),
            ));
        }
        Ok(())
    }

    /// Accounts waiting for a decision
    pub async fn pending_accounts(&self) -> Result<Vec<PendingStudent>> {
        self.ensure_tpo()?;
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.pending_students(s.token()).await })
            .await
    }

    /// Approve a pending account
    pub async fn approve(&self, account_id: &str) -> Result<String> {
        self.decide(account_id, Decision::Approve).await
    }

    /// Reject a pending account
    pub async fn reject(&self, account_id: &str) -> Result<String> {
        self.decide(account_id, Decision::Reject).await
    }

    async fn decide(&self, account_id: &str, decision: Decision) -> Result<String> {
        self.ensure_tpo()?;

        let backend = self.backend.clone();
        let id = account_id.to_string();
        let message = self
            .sessions
            .authorized(|s| async move {
                match decision {
                    Decision::Approve => backend.approve_student(s.token(), &id).await,
                    Decision::Reject => backend.reject_student(s.token(), &id).await,
                }
            })
            .await
            .map_err(|e| resolution_error(account_id, e))?;

        tracing::info!("Account {}: {} recorded", account_id, decision);
        Ok(message.unwrap_or_else(|| match decision {
            Decision::Approve => "Student approved successfully".to_string(),
            Decision::Reject => "Student rejected".to_string(),
        }))
    }
}
