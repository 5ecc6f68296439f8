//! Application workflow
//!
//! Client side of the placement state machine. Every mutation is checked
//! against the same transition table the backend enforces
//! ([`PlacementStatus::transition_allowed`]) before any request is sent, and
//! nothing local is advanced past a failed call: callers re-read the
//! authoritative lists instead.

use std::sync::Arc;

use crate::backend::PlacementBackend;
use crate::error::{PortalError, Result};
use crate::models::{
    Application, Drive, Interview, InterviewRequest, InterviewSlot, PlacementStatus, Role, Session,
};
use crate::services::session::SessionManager;

/// Action a view may offer on an application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Shortlist,
    MarkInterviewed,
    Select,
    Reject,
    ScheduleInterview,
}

impl WorkflowAction {
    /// Status the action moves to; `None` for side effects
    pub fn target(&self) -> Option<PlacementStatus> {
        match self {
            WorkflowAction::Shortlist => Some(PlacementStatus::Shortlisted),
            WorkflowAction::MarkInterviewed => Some(PlacementStatus::Interviewed),
            WorkflowAction::Select => Some(PlacementStatus::Selected),
            WorkflowAction::Reject => Some(PlacementStatus::Rejected),
            WorkflowAction::ScheduleInterview => None,
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowAction::Shortlist => "Shortlist",
            WorkflowAction::MarkInterviewed => "Mark Interviewed",
            WorkflowAction::Select => "Select",
            WorkflowAction::Reject => "Reject",
            WorkflowAction::ScheduleInterview => "Schedule Interview",
        }
    }

    fn for_target(status: PlacementStatus) -> Option<Self> {
        match status {
            PlacementStatus::Shortlisted => Some(WorkflowAction::Shortlist),
            PlacementStatus::Interviewed => Some(WorkflowAction::MarkInterviewed),
            PlacementStatus::Selected => Some(WorkflowAction::Select),
            PlacementStatus::Rejected => Some(WorkflowAction::Reject),
            PlacementStatus::NotApplied | PlacementStatus::Applied => None,
        }
    }
}

/// Role and drive-assignment check for reviewing an application
fn ensure_reviewer(session: &Session, application: &Application) -> Result<()> {
    if !session.role().is_staff() {
        return Err(PortalError::Forbidden(
            "Only TPOs and recruiters can review applications".to_string(),
        ));
    }
    if !session.user().can_manage_drive(&application.drive_id) {
        return Err(PortalError::Forbidden(
            "This application belongs to a drive not assigned to you".to_string(),
        ));
    }
    Ok(())
}

/// Check a status change before sending it.
///
/// Authorization is checked first, so an unassigned recruiter gets
/// `Forbidden` even for an otherwise legal transition.
pub fn check_transition(
    session: &Session,
    application: &Application,
    target: PlacementStatus,
) -> Result<()> {
    ensure_reviewer(session, application)?;
    if !application.status.transition_allowed(session.role(), target) {
        return Err(PortalError::InvalidTransition {
            from: application.status,
            to: target,
        });
    }
    Ok(())
}

/// Treat a refusal that reports existing state as `Conflict`.
///
/// APIs answer a duplicate application or a stale status change with 409,
/// with 400 or with a `success: false` envelope; the wording is the common part.
fn refusal_as_conflict(err: PortalError) -> PortalError {
    match err {
        PortalError::Validation(msg) | PortalError::Backend { message: msg, .. }
            if msg.to_lowercase().contains("already") =>
        {
            PortalError::Conflict(msg)
        }
        other => other,
    }
}

/// Actions the session may take on an application, derived from the table
pub fn available_actions(session: &Session, application: &Application) -> Vec<WorkflowAction> {
    if ensure_reviewer(session, application).is_err() {
        return Vec::new();
    }

    let mut actions: Vec<WorkflowAction> = application
        .status
        .next_states()
        .iter()
        .filter(|to| application.status.transition_allowed(session.role(), **to))
        .filter_map(|to| WorkflowAction::for_target(*to))
        .collect();
    if application.status == PlacementStatus::Shortlisted {
        actions.push(WorkflowAction::ScheduleInterview);
    }
    actions
}

/// Application workflow service
pub struct ApplicationWorkflow {
    backend: Arc<dyn PlacementBackend>,
    sessions: Arc<SessionManager>,
}

impl ApplicationWorkflow {
    /// Create a new workflow service
    pub fn new(backend: Arc<dyn PlacementBackend>, sessions: Arc<SessionManager>) -> Self {
        Self { backend, sessions }
    }

    fn session(&self) -> Result<Session> {
        self.sessions.current().ok_or(PortalError::NotAuthenticated)
    }

    /// Apply to a drive.
    ///
    /// `existing` is the student's current application list; a drive already
    /// applied to is refused locally with `Conflict`. Eligibility is decided
    /// by the backend, which also refuses duplicates.
    pub async fn apply(&self, drive: &Drive, existing: &[Application]) -> Result<String> {
        let session = self.session()?;
        if session.role() != Role::Student {
            return Err(PortalError::Forbidden(
                "Only students can apply to drives".to_string(),
            ));
        }
        if drive.already_applied
            || existing
                .iter()
                .any(|a| a.is_for(session.user_id(), &drive.id))
        {
            return Err(PortalError::Conflict(format!(
                "Already applied to {}",
                drive.company_name
            )));
        }

        let backend = self.backend.clone();
        let drive_id = drive.id.clone();
        let message = self
            .sessions
            .authorized(|s| async move { backend.apply(s.token(), &drive_id).await })
            .await
            .map_err(refusal_as_conflict)?;
        tracing::info!("Student {} applied to drive {}", session.user_id(), drive.id);
        Ok(message.unwrap_or_else(|| "Application submitted successfully".to_string()))
    }

    /// Move an application to `target`.
    ///
    /// Returns the updated application; the input is left untouched, so a
    /// failure never leaves a half-advanced local copy.
    pub async fn update_status(
        &self,
        application: &Application,
        target: PlacementStatus,
    ) -> Result<Application> {
        let session = self.session()?;
        check_transition(&session, application, target)?;

        let backend = self.backend.clone();
        let id = application.id.clone();
        let from = application.status;
        let result = self
            .sessions
            .authorized(|s| async move {
                backend
                    .update_application_status(s.token(), &id, from, target)
                    .await
            })
            .await
            .map_err(refusal_as_conflict);
        if let Err(e) = result {
            if matches!(e, PortalError::Conflict(_)) {
                tracing::warn!(
                    "Application {} changed elsewhere, refusing stale {} -> {}",
                    application.id,
                    application.status,
                    target
                );
            }
            return Err(e);
        }

        tracing::info!(
            "Application {} moved {} -> {}",
            application.id,
            application.status,
            target
        );
        let mut updated = application.clone();
        updated.status = target;
        Ok(updated)
    }

    /// Schedule an interview for a shortlisted application.
    ///
    /// Does not change the status; marking the candidate interviewed is a
    /// separate [`update_status`](Self::update_status) call.
    pub async fn schedule_interview(
        &self,
        application: &Application,
        slot: &InterviewSlot,
    ) -> Result<String> {
        let session = self.session()?;
        ensure_reviewer(&session, application)?;
        if application.status != PlacementStatus::Shortlisted {
            return Err(PortalError::NotSchedulable(application.status));
        }

        let request = InterviewRequest::new(&application.student_id, &application.drive_id, slot);
        let backend = self.backend.clone();
        let id = self
            .sessions
            .authorized(|s| async move { backend.schedule_interview(s.token(), &request).await })
            .await?;
        tracing::info!("Interview {} scheduled for application {}", id, application.id);
        Ok(id)
    }

    /// The student's own applications
    pub async fn student_applications(&self) -> Result<Vec<Application>> {
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.student_applications(s.token()).await })
            .await
    }

    /// Applications for one drive
    pub async fn drive_applications(&self, drive_id: &str) -> Result<Vec<Application>> {
        let backend = self.backend.clone();
        let drive_id = drive_id.to_string();
        self.sessions
            .authorized(|s| async move { backend.drive_applications(s.token(), &drive_id).await })
            .await
    }

    /// Every application (TPO)
    pub async fn all_applications(&self) -> Result<Vec<Application>> {
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.all_applications(s.token()).await })
            .await
    }

    /// Drives the student is eligible for
    pub async fn eligible_drives(&self) -> Result<Vec<Drive>> {
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.eligible_drives(s.token()).await })
            .await
    }

    /// Eligible drives ranked by the backend
    pub async fn recommended_drives(&self) -> Result<Vec<Drive>> {
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.recommended_drives(s.token()).await })
            .await
    }

    /// The student's scheduled interviews
    pub async fn my_interviews(&self) -> Result<Vec<Interview>> {
        let backend = self.backend.clone();
        self.sessions
            .authorized(|s| async move { backend.my_interviews(s.token()).await })
            .await
    }
}
