//! Session model

use serde::{Deserialize, Serialize};

use super::user::{AccountStatus, Role, User};
use crate::error::{PortalError, Result};

/// An authenticated session.
///
/// Only constructible through [`Session::issue`], which refuses accounts that
/// are not active. Fields are private so the role cannot change for the life
/// of the token; a different role means a new login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    /// Issue a session for a user holding `token`
    pub fn issue(token: impl Into<String>, user: User) -> Result<Self> {
        match user.status {
            AccountStatus::Active => {}
            AccountStatus::PendingApproval => return Err(PortalError::AccountPending),
            AccountStatus::Rejected => return Err(PortalError::AccountRejected),
        }
        let token = token.into();
        if token.trim().is_empty() {
            return Err(PortalError::Validation("Empty session token".to_string()));
        }
        Ok(Self { token, user })
    }

    /// Bearer token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// User ID
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Role fixed at login
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Account status at login (always active)
    pub fn account_status(&self) -> AccountStatus {
        self.user.status
    }

    /// Read-only view of the user record
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Persistable form of this session
    pub fn to_credentials(&self) -> StoredCredentials {
        StoredCredentials {
            token: self.token.clone(),
            user: Some(self.user.clone()),
        }
    }
}

/// What the credential store holds: the token and the last-known user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Session lifecycle as seen by readers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// A stored token is being validated; callers must wait
    Restoring,
    /// No valid session
    Anonymous,
    /// Logged in
    Authenticated(Session),
}

impl SessionState {
    /// The session, if authenticated
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Check if restoration is still in flight
    pub fn is_restoring(&self) -> bool {
        matches!(self, SessionState::Restoring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(status: AccountStatus) -> User {
        User {
            id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: Role::Student,
            status,
            assigned_drives: vec![],
        }
    }

    #[test]
    fn test_issue_active() {
        let session = Session::issue("tok", user(AccountStatus::Active)).unwrap();
        assert_eq!(session.token(), "tok");
        assert_eq!(session.role(), Role::Student);
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.account_status(), AccountStatus::Active);
    }

    #[test]
    fn test_issue_refuses_pending_and_rejected() {
        assert!(matches!(
            Session::issue("tok", user(AccountStatus::PendingApproval)),
            Err(PortalError::AccountPending)
        ));
        assert!(matches!(
            Session::issue("tok", user(AccountStatus::Rejected)),
            Err(PortalError::AccountRejected)
        ));
    }

    #[test]
    fn test_issue_refuses_empty_token() {
        assert!(matches!(
            Session::issue("  ", user(AccountStatus::Active)),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn test_state_accessors() {
        let session = Session::issue("tok", user(AccountStatus::Active)).unwrap();
        let state = SessionState::Authenticated(session.clone());
        assert_eq!(state.session(), Some(&session));
        assert!(SessionState::Restoring.is_restoring());
        assert!(SessionState::Anonymous.session().is_none());
    }
}
