//! Access guard

use crate::models::{Role, SessionState};

use super::routes::default_landing_route;

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session restoration in flight; show a loading state
    Pending,
    /// Render the view
    Allow,
    /// No valid session
    RedirectToLogin,
    /// Wrong role; go to the role's own landing route
    RedirectToOwnArea(&'static str),
}

impl Access {
    /// Redirect target, if any
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Access::RedirectToLogin => Some(super::routes::LOGIN_ROUTE),
            Access::RedirectToOwnArea(path) => Some(*path),
            Access::Pending | Access::Allow => None,
        }
    }
}

/// Decide whether a view requiring one of `required_roles` may render.
///
/// An empty role set admits any authenticated user. A mismatched role is
/// always sent to its own landing route, never to the requested one.
pub fn authorize(state: &SessionState, required_roles: &[Role]) -> Access {
    match state {
        SessionState::Restoring => Access::Pending,
        SessionState::Anonymous => Access::RedirectToLogin,
        SessionState::Authenticated(session) => {
            let role = session.role();
            if required_roles.is_empty() || required_roles.contains(&role) {
                Access::Allow
            } else {
                tracing::debug!("Role {} denied, redirecting to own area", role);
                Access::RedirectToOwnArea(default_landing_route(role))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{AccountStatus, Role, Session, SessionState, User};

    pub fn authenticated(role: Role) -> SessionState {
        let user = User {
            id: "u1".to_string(),
            name: "Test".to_string(),
            email: "test@campus.edu".to_string(),
            role,
            status: AccountStatus::Active,
            assigned_drives: Vec::new(),
        };
        match Session::issue("token-1", user) {
            Ok(session) => SessionState::Authenticated(session),
            Err(e) => panic!("active user must get a session: {}", e),
        }
    }
}
