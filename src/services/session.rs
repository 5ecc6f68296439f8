//! Session manager
//!
//! Owns the login lifecycle and is the only writer of the credential store:
//! - Registration (never yields a session)
//! - Login with distinct pending / rejected / invalid-credential failures
//! - Restoration of a stored token at process start
//! - Logout, local first and best-effort on the server
//! - Central teardown when any authenticated call reports `SessionExpired`
//!
//! The current `SessionState` is published on a `watch` channel; readers get
//! snapshots or subscribe, they never mutate it.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::backend::PlacementBackend;
use crate::error::{PortalError, Result};
use crate::models::{RegisterInput, Role, Session, SessionState};
use crate::routing::{self, Access};
use crate::services::password::check_password_policy;
use crate::store::{clear_credentials, load_credentials, save_credentials, CredentialStore};

/// Shown when the backend accepts a registration without a message
pub const DEFAULT_REGISTER_MESSAGE: &str =
    "Registration successful. Your account is pending TPO approval.";

/// Session manager
pub struct SessionManager {
    backend: Arc<dyn PlacementBackend>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Create a session manager.
    ///
    /// Starts in `Restoring` when the store holds a token, so guards wait for
    /// [`restore_session`](Self::restore_session) instead of redirecting.
    pub fn new(backend: Arc<dyn PlacementBackend>, store: Arc<dyn CredentialStore>) -> Self {
        let initial = match load_credentials(store.as_ref()) {
            Ok(Some(_)) => SessionState::Restoring,
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                tracing::warn!("Failed to read stored credentials: {}", e);
                SessionState::Anonymous
            }
        };
        let (state, _) = watch::channel(initial);
        Self {
            backend,
            store,
            state,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current session, if authenticated
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Access decision for a view requiring one of `required_roles`
    pub fn authorize(&self, required_roles: &[Role]) -> Access {
        routing::authorize(&self.state.borrow(), required_roles)
    }

    /// Register a student account.
    ///
    /// Returns the backend's message. The account starts pending approval;
    /// no session is created.
    pub async fn register(&self, input: RegisterInput) -> Result<String> {
        validate_register_input(&input)?;

        let input = RegisterInput::new(
            input.name.trim(),
            input.email.trim().to_lowercase(),
            input.password,
            input.department.trim(),
            input.roll_number.trim(),
        );
        let message = self.backend.register(&input).await?;
        tracing::info!("Registered student account {}", input.email);
        Ok(message.unwrap_or_else(|| DEFAULT_REGISTER_MESSAGE.to_string()))
    }

    /// Log in and persist the session.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown email or wrong password
    /// - `AccountPending` / `AccountRejected` for accounts that are not active
    /// - `Validation` for blank input
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(PortalError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let grant = match self.backend.login(email, password).await {
            Ok(grant) => grant,
            Err(e) => {
                tracing::info!("Login refused for {}: {}", email, e.code());
                return Err(e);
            }
        };
        let session = Session::issue(grant.token, grant.user)?;

        save_credentials(self.store.as_ref(), &session.to_credentials())?;
        self.state
            .send_replace(SessionState::Authenticated(session.clone()));
        tracing::info!("User {} logged in as {}", session.user_id(), session.role());
        Ok(session)
    }

    /// Validate a stored token against the backend.
    ///
    /// Any failure clears the store and leaves the manager `Anonymous`. A
    /// successful restore does not touch the store.
    pub async fn restore_session(&self) -> Option<Session> {
        let credentials = match load_credentials(self.store.as_ref()) {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                self.state.send_replace(SessionState::Anonymous);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read stored credentials: {}", e);
                self.teardown();
                return None;
            }
        };

        self.state.send_replace(SessionState::Restoring);
        let restored = match self.backend.me(&credentials.token).await {
            Ok(user) => Session::issue(credentials.token, user),
            Err(e) => Err(e),
        };

        match restored {
            Ok(session) => {
                tracing::info!("Restored session for user {}", session.user_id());
                self.state
                    .send_replace(SessionState::Authenticated(session.clone()));
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Stored session is no longer valid: {}", e);
                self.teardown();
                None
            }
        }
    }

    /// Log out.
    ///
    /// Local credentials are cleared first and unconditionally; the server
    /// call is best-effort and is made even when clearing the store fails.
    /// Safe to call when already logged out.
    pub async fn logout(&self) -> Result<()> {
        let token = match self.current() {
            Some(session) => Some(session.token().to_string()),
            None => load_credentials(self.store.as_ref())
                .ok()
                .flatten()
                .map(|c| c.token),
        };

        let cleared = clear_credentials(self.store.as_ref());
        self.state.send_replace(SessionState::Anonymous);

        // A storage failure must not keep the token alive on the server
        if let Some(token) = token {
            if let Err(e) = self.backend.logout(&token).await {
                tracing::warn!("Server-side logout failed: {}", e);
            }
            tracing::info!("Logged out");
        }
        cleared
    }

    /// Run a backend call with the current session.
    ///
    /// A `SessionExpired` result tears the session down before the error is
    /// returned, so the next access check redirects to login.
    pub async fn authorized<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.current().ok_or(PortalError::NotAuthenticated)?;
        match call(session).await {
            Err(PortalError::SessionExpired) => {
                self.invalidate();
                Err(PortalError::SessionExpired)
            }
            other => other,
        }
    }

    /// Drop the session after the backend rejected its token
    pub fn invalidate(&self) {
        if self.state.borrow().session().is_some() {
            tracing::warn!("Session expired, clearing stored credentials");
        }
        self.teardown();
    }

    fn teardown(&self) {
        if let Err(e) = clear_credentials(self.store.as_ref()) {
            tracing::warn!("Failed to clear stored credentials: {}", e);
        }
        self.state.send_replace(SessionState::Anonymous);
    }
}

/// Client-side checks on a registration form
pub fn validate_register_input(input: &RegisterInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(PortalError::Validation("Name is required".to_string()));
    }
    if !is_valid_email(&input.email) {
        return Err(PortalError::Validation("A valid email is required".to_string()));
    }
    if let Some(reason) = check_password_policy(&input.password) {
        return Err(PortalError::Validation(reason));
    }
    if input.department.trim().is_empty() {
        return Err(PortalError::Validation("Department is required".to_string()));
    }
    if input.roll_number.trim().is_empty() {
        return Err(PortalError::Validation("Roll number is required".to_string()));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
