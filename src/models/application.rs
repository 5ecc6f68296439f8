//! Application model
//!
//! An application is one student's candidacy for one drive. Its status moves
//! through a fixed graph:
//!
//! ```text
//! NOT_APPLIED -> APPLIED -> SHORTLISTED -> INTERVIEWED -> SELECTED
//!                   |           |              |
//!                   +-----------+--------------+--> REJECTED
//! ```
//!
//! `NOT_APPLIED` is never stored; it stands for the absence of an application
//! for a (student, drive) pair. `SELECTED` and `REJECTED` are terminal.
//!
//! The table below is the single source of truth for both UI enablement and
//! enforcement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::drive::{Drive, StudentProfile};
use super::user::Role;

/// Placement status of a (student, drive) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementStatus {
    /// No application exists
    NotApplied,
    /// Application submitted by the student
    Applied,
    /// Passed initial screening
    Shortlisted,
    /// Interview held
    Interviewed,
    /// Offer made (terminal)
    Selected,
    /// Dropped from the pipeline (terminal)
    Rejected,
}

impl PlacementStatus {
    /// All statuses, in pipeline order
    pub const ALL: [PlacementStatus; 6] = [
        PlacementStatus::NotApplied,
        PlacementStatus::Applied,
        PlacementStatus::Shortlisted,
        PlacementStatus::Interviewed,
        PlacementStatus::Selected,
        PlacementStatus::Rejected,
    ];

    /// Statuses reachable in one step
    pub fn next_states(&self) -> &'static [PlacementStatus] {
        use PlacementStatus::*;
        match self {
            NotApplied => &[Applied],
            Applied => &[Shortlisted, Rejected],
            Shortlisted => &[Interviewed, Rejected],
            Interviewed => &[Selected, Rejected],
            Selected | Rejected => &[],
        }
    }

    /// Check if `to` is reachable in one step
    pub fn can_transition_to(&self, to: PlacementStatus) -> bool {
        self.next_states().contains(&to)
    }

    /// Check if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }

    /// Check if the role may move an application out of this status.
    ///
    /// Only students create applications; only TPOs and recruiters review
    /// them. Drive assignment is checked separately.
    pub fn actor_permitted(&self, role: Role) -> bool {
        match self {
            PlacementStatus::NotApplied => role == Role::Student,
            PlacementStatus::Selected | PlacementStatus::Rejected => false,
            _ => role.is_staff(),
        }
    }

    /// Check the full table row: edge exists and the role may take it
    pub fn transition_allowed(&self, role: Role, to: PlacementStatus) -> bool {
        self.can_transition_to(to) && self.actor_permitted(role)
    }

    /// Position on the progress bar (`None` for rejected)
    pub fn stage(&self) -> Option<u8> {
        match self {
            PlacementStatus::NotApplied => Some(0),
            PlacementStatus::Applied => Some(1),
            PlacementStatus::Shortlisted => Some(2),
            PlacementStatus::Interviewed => Some(3),
            PlacementStatus::Selected => Some(4),
            PlacementStatus::Rejected => None,
        }
    }
}

impl Default for PlacementStatus {
    fn default() -> Self {
        Self::NotApplied
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlacementStatus::NotApplied => "NOT_APPLIED",
            PlacementStatus::Applied => "APPLIED",
            PlacementStatus::Shortlisted => "SHORTLISTED",
            PlacementStatus::Interviewed => "INTERVIEWED",
            PlacementStatus::Selected => "SELECTED",
            PlacementStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PlacementStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NOT_APPLIED" => Ok(PlacementStatus::NotApplied),
            "APPLIED" => Ok(PlacementStatus::Applied),
            "SHORTLISTED" => Ok(PlacementStatus::Shortlisted),
            "INTERVIEWED" => Ok(PlacementStatus::Interviewed),
            "SELECTED" => Ok(PlacementStatus::Selected),
            "REJECTED" => Ok(PlacementStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid placement status: {}", s)),
        }
    }
}

/// Application record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Unique identifier
    pub id: String,
    /// Applying student
    pub student_id: String,
    /// Drive applied to
    #[serde(rename = "company_id")]
    pub drive_id: String,
    /// Current status (never `NOT_APPLIED` for a stored record)
    pub status: PlacementStatus,
    /// Submission timestamp
    pub applied_at: DateTime<Utc>,
    /// Embedded drive, when the backend includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Drive>,
    /// Embedded student profile, when the backend includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
}

impl Application {
    /// Create a freshly submitted application
    pub fn new(id: impl Into<String>, student_id: impl Into<String>, drive_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            student_id: student_id.into(),
            drive_id: drive_id.into(),
            status: PlacementStatus::Applied,
            applied_at: Utc::now(),
            company: None,
            student: None,
        }
    }

    /// Check if this application is for the given (student, drive) pair
    pub fn is_for(&self, student_id: &str, drive_id: &str) -> bool {
        self.student_id == student_id && self.drive_id == drive_id
    }
}

/// Per-status counts over one student's applications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementSummary {
    pub total: usize,
    pub shortlisted: usize,
    pub interviewed: usize,
    pub selected: usize,
    pub rejected: usize,
}

impl PlacementSummary {
    /// Count applications by status
    pub fn from_applications(applications: &[Application]) -> Self {
        let mut summary = Self {
            total: applications.len(),
            ..Self::default()
        };
        for app in applications {
            match app.status {
                PlacementStatus::Shortlisted => summary.shortlisted += 1,
                PlacementStatus::Interviewed => summary.interviewed += 1,
                PlacementStatus::Selected => summary.selected += 1,
                PlacementStatus::Rejected => summary.rejected += 1,
                PlacementStatus::NotApplied | PlacementStatus::Applied => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use PlacementStatus::*;
        assert!(NotApplied.can_transition_to(Applied));
        assert!(Applied.can_transition_to(Shortlisted));
        assert!(Applied.can_transition_to(Rejected));
        assert!(Shortlisted.can_transition_to(Interviewed));
        assert!(Interviewed.can_transition_to(Selected));

        assert!(!Applied.can_transition_to(Selected));
        assert!(!Applied.can_transition_to(Interviewed));
        assert!(!Shortlisted.can_transition_to(Applied));
        assert!(!NotApplied.can_transition_to(Rejected));
        assert!(Selected.is_terminal());
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn test_actor_permitted() {
        use PlacementStatus::*;
        assert!(NotApplied.actor_permitted(Role::Student));
        assert!(!NotApplied.actor_permitted(Role::Tpo));
        assert!(Applied.actor_permitted(Role::Recruiter));
        assert!(Interviewed.actor_permitted(Role::Tpo));
        assert!(!Shortlisted.actor_permitted(Role::Student));
        assert!(!Selected.actor_permitted(Role::Tpo));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&PlacementStatus::NotApplied).unwrap(),
            "\"NOT_APPLIED\""
        );
        let status: PlacementStatus = serde_json::from_str("\"SHORTLISTED\"").unwrap();
        assert_eq!(status, PlacementStatus::Shortlisted);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(PlacementStatus::from_str("interviewed").unwrap(), PlacementStatus::Interviewed);
        assert!(PlacementStatus::from_str("HIRED").is_err());
    }

    #[test]
    fn test_stage() {
        assert_eq!(PlacementStatus::NotApplied.stage(), Some(0));
        assert_eq!(PlacementStatus::Selected.stage(), Some(4));
        assert_eq!(PlacementStatus::Rejected.stage(), None);
    }

    #[test]
    fn test_application_uses_company_id_on_the_wire() {
        let app = Application::new("a1", "s1", "d1");
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["company_id"], "d1");
        assert_eq!(json["status"], "APPLIED");
        assert!(json.get("company").is_none());
    }

    #[test]
    fn test_summary() {
        let mut apps = vec![
            Application::new("a1", "s1", "d1"),
            Application::new("a2", "s1", "d2"),
            Application::new("a3", "s1", "d3"),
        ];
        apps[1].status = PlacementStatus::Selected;
        apps[2].status = PlacementStatus::Rejected;

        let summary = PlacementSummary::from_applications(&apps);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.selected, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.shortlisted, 0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = PlacementStatus> {
        prop::sample::select(PlacementStatus::ALL.to_vec())
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Status never moves backward along the pipeline.
        #[test]
        fn transitions_never_go_backward(from in status_strategy(), to in status_strategy()) {
            if from.can_transition_to(to) && to != PlacementStatus::Rejected {
                prop_assert!(to.stage().unwrap() == from.stage().unwrap() + 1);
            }
        }

        /// Nothing leaves a terminal status, whoever asks.
        #[test]
        fn terminal_states_are_closed(to in status_strategy(), role in role_strategy()) {
            for from in [PlacementStatus::Selected, PlacementStatus::Rejected] {
                prop_assert!(!from.transition_allowed(role, to));
            }
        }

        /// Any sequence of allowed transitions is a path through the graph;
        /// SELECTED is only ever reached through INTERVIEWED.
        #[test]
        fn random_walks_stay_on_the_graph(choices in prop::collection::vec(0usize..4, 0..10)) {
            let mut status = PlacementStatus::NotApplied;
            let mut path = vec![status];
            for choice in choices {
                let next = status.next_states();
                if next.is_empty() {
                    break;
                }
                status = next[choice % next.len()];
                path.push(status);
            }
            for pair in path.windows(2) {
                prop_assert!(pair[0].can_transition_to(pair[1]));
            }
            if let Some(pos) = path.iter().position(|s| *s == PlacementStatus::Selected) {
                prop_assert_eq!(path[pos - 1], PlacementStatus::Interviewed);
            }
        }
    }
}
