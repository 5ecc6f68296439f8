//! Services layer - session lifecycle and workflows
//!
//! Services coordinate the backend and the credential store:
//! - `SessionManager` is the only writer of stored credentials
//! - Workflows check the transition and approval rules before calling out
//! - Nothing local is advanced past a failed backend call

pub mod approval;
pub mod notifications;
pub mod password;
pub mod session;
pub mod workflow;

pub use approval::{AccountApproval, Decision};
pub use notifications::NotificationCenter;
pub use password::{check_password_policy, hash_password, verify_password};
pub use session::{validate_register_input, SessionManager, DEFAULT_REGISTER_MESSAGE};
pub use workflow::{available_actions, check_transition, ApplicationWorkflow, WorkflowAction};
