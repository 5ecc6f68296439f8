//! Data models
//!
//! This module contains the data structures shared by the portal core:
//! - Accounts and sessions (User, Role, AccountStatus, Session)
//! - The placement pipeline (PlacementStatus, Application)
//! - Backend-owned records read by the core (Drive, StudentProfile, Interview, Notification)

mod application;
mod drive;
mod interview;
mod session;
mod user;

pub use application::{Application, PlacementStatus, PlacementSummary};
pub use drive::{Drive, StudentProfile};
pub use interview::{Interview, InterviewMode, InterviewRequest, InterviewSlot, Notification, NotificationFeed};
pub use session::{Session, SessionState, StoredCredentials};
pub use user::{AccountStatus, PendingStudent, RegisterInput, Role, User};
