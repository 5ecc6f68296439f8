//! Error types
//!
//! Every failure the portal core can report to a view. Login failures have
//! one variant each so the caller can show the precise pending, rejected or
//! invalid-credentials message instead of a generic error.

use crate::models::PlacementStatus;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PortalError>;

/// Error types for portal operations
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Malformed client input, fixable by the user immediately
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account exists but a TPO has not approved it yet
    #[error("Account is pending approval")]
    AccountPending,

    /// Account was rejected by a TPO
    #[error("Account has been rejected")]
    AccountRejected,

    /// Transition not present in the application workflow table
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: PlacementStatus,
        to: PlacementStatus,
    },

    /// Interviews need a shortlisted application
    #[error("Interviews can only be scheduled for shortlisted applications (current status {0})")]
    NotSchedulable(PlacementStatus),

    /// Role or drive-assignment mismatch
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Stale state: duplicate application, concurrent transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Approval decision already made for this account
    #[error("Account {0} has already been resolved")]
    AlreadyResolved(String),

    /// Transport failure, no response received
    #[error("Network error: {0}")]
    Network(String),

    /// Token rejected by the backend (401)
    #[error("Session expired")]
    SessionExpired,

    /// Operation requires a logged-in session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success response that fits no other kind
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Credential store could not be read or written
    #[error("Credential storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PortalError::Validation(_) => "VALIDATION_ERROR",
            PortalError::InvalidCredentials => "INVALID_CREDENTIALS",
            PortalError::AccountPending => "ACCOUNT_PENDING",
            PortalError::AccountRejected => "ACCOUNT_REJECTED",
            PortalError::InvalidTransition { .. } => "INVALID_TRANSITION",
            PortalError::NotSchedulable(_) => "NOT_SCHEDULABLE",
            PortalError::Forbidden(_) => "FORBIDDEN",
            PortalError::Conflict(_) => "CONFLICT",
            PortalError::AlreadyResolved(_) => "ALREADY_RESOLVED",
            PortalError::Network(_) => "NETWORK_ERROR",
            PortalError::SessionExpired => "SESSION_EXPIRED",
            PortalError::NotAuthenticated => "NOT_AUTHENTICATED",
            PortalError::NotFound(_) => "NOT_FOUND",
            PortalError::Backend { .. } => "BACKEND_ERROR",
            PortalError::Storage(_) => "STORAGE_ERROR",
            PortalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message suitable for an inline error or toast
    pub fn user_message(&self) -> String {
        match self {
            PortalError::InvalidCredentials => "Invalid email or password.".to_string(),
            PortalError::AccountPending => {
                "Your account is pending approval from the Training & Placement Officer. \
                 Please check back later."
                    .to_string()
            }
            PortalError::AccountRejected => {
                "Your registration has been rejected. Please contact the placement office."
                    .to_string()
            }
            PortalError::Network(_) => {
                "Network error: Unable to reach server. Please try again.".to_string()
            }
            PortalError::SessionExpired | PortalError::NotAuthenticated => {
                "Your session has ended. Please log in again.".to_string()
            }
            PortalError::AlreadyResolved(_) => {
                "This account has already been approved or rejected.".to_string()
            }
            PortalError::Validation(msg)
            | PortalError::Forbidden(msg)
            | PortalError::Conflict(msg)
            | PortalError::NotFound(msg) => msg.clone(),
            PortalError::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Check if the error is one of the three login refusals
    pub fn is_login_refusal(&self) -> bool {
        matches!(
            self,
            PortalError::InvalidCredentials | PortalError::AccountPending | PortalError::AccountRejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_refusals_have_distinct_messages() {
        let pending = PortalError::AccountPending.user_message();
        let rejected = PortalError::AccountRejected.user_message();
        let invalid = PortalError::InvalidCredentials.user_message();

        assert_ne!(pending, rejected);
        assert_ne!(pending, invalid);
        assert_ne!(rejected, invalid);
        assert!(pending.contains("pending"));
        assert!(rejected.contains("rejected"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(PortalError::AccountPending.code(), "ACCOUNT_PENDING");
        assert_eq!(PortalError::SessionExpired.code(), "SESSION_EXPIRED");
        assert_eq!(
            PortalError::InvalidTransition {
                from: PlacementStatus::Applied,
                to: PlacementStatus::Selected,
            }
            .code(),
            "INVALID_TRANSITION"
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = PortalError::InvalidTransition {
            from: PlacementStatus::Applied,
            to: PlacementStatus::Selected,
        };
        assert_eq!(err.to_string(), "Invalid transition from APPLIED to SELECTED");
    }

    #[test]
    fn test_is_login_refusal() {
        assert!(PortalError::InvalidCredentials.is_login_refusal());
        assert!(PortalError::AccountRejected.is_login_refusal());
        assert!(!PortalError::SessionExpired.is_login_refusal());
    }
}
