//! User model
//!
//! This module defines the user record returned by the placement API and the
//! closed set of roles and account states it can carry.
//!
//! Accounts created through self-registration are always students and start
//! in `pending_approval`. TPO and recruiter accounts are created
//! administratively and are `active` from the start.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User record as known to the client (the last-known copy is cached in the
/// credential store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique, used for login)
    pub email: String,
    /// User role
    pub role: Role,
    /// Account approval status
    pub status: AccountStatus,
    /// Drives a recruiter is allowed to act on (empty for other roles)
    #[serde(default)]
    pub assigned_drives: Vec<String>,
}

impl User {
    /// Check if the account may hold a session
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Check if the user may operate on applications of the given drive.
    ///
    /// TPOs may act on every drive; recruiters only on their assigned drives;
    /// students never operate on other people's applications.
    pub fn can_manage_drive(&self, drive_id: &str) -> bool {
        match self.role {
            Role::Tpo => true,
            Role::Recruiter => self.assigned_drives.iter().any(|d| d == drive_id),
            Role::Student => false,
        }
    }
}

/// User role for authorization.
///
/// The set is closed: adding a role is a compile-time-checked change to every
/// exhaustive match over it (landing routes, navigation, workflow actors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Student - applies to drives
    Student,
    /// Training & Placement Officer - approves accounts, manages drives
    Tpo,
    /// Recruiter - manages applications on assigned drives
    Recruiter,
}

impl Role {
    /// All roles, in display order
    pub const ALL: [Role; 3] = [Role::Student, Role::Tpo, Role::Recruiter];

    /// Heading shown above the role's navigation
    pub fn portal_label(&self) -> &'static str {
        match self {
            Role::Student => "Student Portal",
            Role::Tpo => "TPO Dashboard",
            Role::Recruiter => "Recruiter Panel",
        }
    }

    /// Roles that move applications through the review pipeline
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Tpo | Role::Recruiter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Tpo => write!(f, "tpo"),
            Role::Recruiter => write!(f, "recruiter"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "tpo" => Ok(Role::Tpo),
            "recruiter" => Ok(Role::Recruiter),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Account approval status.
///
/// `Active` and `Rejected` are terminal: nothing in this system moves an
/// account out of either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Registered, waiting for a TPO decision
    PendingApproval,
    /// Approved - may log in
    Active,
    /// Rejected - may never log in
    Rejected,
}

impl AccountStatus {
    /// Check if no further approval decision is possible
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AccountStatus::PendingApproval)
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::PendingApproval
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::PendingApproval => write!(f, "pending_approval"),
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for AccountStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending_approval" | "pending" => Ok(AccountStatus::PendingApproval),
            "active" => Ok(AccountStatus::Active),
            "rejected" => Ok(AccountStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid account status: {}", s)),
        }
    }
}

/// A student account awaiting (or past) TPO review, as listed for the TPO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingStudent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub roll_number: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub created_at: String,
}

/// Input for student self-registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub roll_number: String,
}

impl RegisterInput {
    /// Create a new registration input
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        department: impl Into<String>,
        roll_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            department: department.into(),
            roll_number: roll_number.into(),
        }
    }
}
