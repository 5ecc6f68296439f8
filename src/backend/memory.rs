//! In-memory placement backend
//!
//! Holds accounts, drives, applications, interviews and notifications in a
//! single `RwLock`ed state and enforces every rule the real API enforces:
//! role checks, recruiter drive assignment, the status table, eligibility,
//! duplicate applications and one-shot approval decisions. The client-side
//! checks are a convenience; this is the authority tests run against.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LoginGrant, PlacementBackend};
use crate::error::{PortalError, Result};
use crate::models::{
    AccountStatus, Application, Drive, Interview, InterviewRequest, Notification, NotificationFeed,
    PendingStudent, PlacementStatus, RegisterInput, Role, StudentProfile, User,
};
use crate::services::password::{hash_password, verify_password};

/// Message returned for a successful registration
pub const REGISTERED_MESSAGE: &str =
    "Registration successful. Your account is pending TPO approval.";

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password_hash: String,
    created_at: String,
    profile: Option<StudentProfile>,
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    drives: Vec<Drive>,
    applications: Vec<Application>,
    interviews: Vec<Interview>,
    notifications: Vec<Notification>,
}

impl State {
    fn account(&self, user_id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.user.id == user_id)
    }

    fn account_mut(&mut self, user_id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.user.id == user_id)
    }

    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email.trim()))
    }

    fn drive(&self, drive_id: &str) -> Result<&Drive> {
        self.drives
            .iter()
            .find(|d| d.id == drive_id)
            .ok_or_else(|| PortalError::NotFound(format!("Drive {} not found", drive_id)))
    }

    /// Resolve a bearer token to the current account record.
    ///
    /// The user is re-read on every call, so approvals and assignment
    /// changes apply immediately.
    fn caller(&self, token: &str) -> Result<User> {
        let user_id = self.tokens.get(token).ok_or(PortalError::SessionExpired)?;
        let account = self.account(user_id).ok_or(PortalError::SessionExpired)?;
        if !account.user.is_active() {
            return Err(PortalError::SessionExpired);
        }
        Ok(account.user.clone())
    }

    fn profile_of(&self, user_id: &str) -> Result<StudentProfile> {
        self.account(user_id)
            .and_then(|a| a.profile.clone())
            .ok_or_else(|| PortalError::NotFound("Student profile not found".to_string()))
    }

    fn notify(&mut self, user_id: &str, kind: &str, message: String) {
        self.notifications.push(Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message,
            kind: kind.to_string(),
            read: false,
            created_at: Utc::now().to_rfc3339(),
        });
    }

    /// Drive listing as a given student sees it
    fn drives_for_student(&self, student: &User) -> Result<Vec<Drive>> {
        let profile = self.profile_of(&student.id)?;
        let mut drives: Vec<Drive> = self
            .drives
            .iter()
            .filter(|d| d.is_eligible(&profile))
            .cloned()
            .map(|mut d| {
                d.already_applied = self
                    .applications
                    .iter()
                    .any(|a| a.is_for(&student.id, &d.id));
                d
            })
            .collect();
        drives.sort_by(|a, b| a.drive_date.cmp(&b.drive_date));
        Ok(drives)
    }

    fn with_drive(&self, mut application: Application) -> Application {
        application.company = self.drives.iter().find(|d| d.id == application.drive_id).cloned();
        application
    }

    fn with_student(&self, mut application: Application) -> Application {
        application.student = self
            .account(&application.student_id)
            .and_then(|a| a.profile.clone());
        application
    }

    /// Recruiters may only act on drives assigned to them; TPOs on all
    fn ensure_manages(&self, user: &User, drive_id: &str) -> Result<()> {
        if user.can_manage_drive(drive_id) {
            Ok(())
        } else {
            Err(PortalError::Forbidden(format!(
                "Drive {} is not assigned to you",
                drive_id
            )))
        }
    }
}

fn require_role(user: &User, role: Role) -> Result<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(PortalError::Forbidden(format!("Requires {} role", role)))
    }
}

fn require_staff(user: &User) -> Result<()> {
    if user.role.is_staff() {
        Ok(())
    } else {
        Err(PortalError::Forbidden("Requires TPO or recruiter role".to_string()))
    }
}

/// Self-contained backend with server-side rule enforcement
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account directly, bypassing registration.
    ///
    /// Staff accounts are provisioned this way; students created here get an
    /// empty academic profile.
    pub async fn add_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        status: AccountStatus,
    ) -> Result<User> {
        let password_hash = hash_password(password)?;
        let mut state = self.state.write().await;
        if state.account_by_email(email).is_some() {
            return Err(PortalError::Conflict("Email already registered".to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.trim().to_lowercase(),
            role,
            status,
            assigned_drives: Vec::new(),
        };
        let profile = (role == Role::Student).then(|| StudentProfile {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            name: name.to_string(),
            department: String::new(),
            roll_number: String::new(),
            gpa: 0.0,
            backlogs: 0,
            skills: Vec::new(),
            placement_status: PlacementStatus::NotApplied,
        });

        state.accounts.push(Account {
            user: user.clone(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
            profile,
        });
        Ok(user)
    }

    /// Publish a drive
    pub async fn add_drive(&self, drive: Drive) {
        self.state.write().await.drives.push(drive);
    }

    /// Assign a drive to a recruiter
    pub async fn assign_drive(&self, recruiter_id: &str, drive_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.drive(drive_id)?;
        let account = state
            .account_mut(recruiter_id)
            .ok_or_else(|| PortalError::NotFound(format!("User {} not found", recruiter_id)))?;
        if account.user.role != Role::Recruiter {
            return Err(PortalError::Validation(
                "Drives can only be assigned to recruiters".to_string(),
            ));
        }
        if !account.user.assigned_drives.iter().any(|d| d == drive_id) {
            account.user.assigned_drives.push(drive_id.to_string());
        }
        if let Some(drive) = state.drives.iter_mut().find(|d| d.id == drive_id) {
            drive.recruiter_id = Some(recruiter_id.to_string());
        }
        Ok(())
    }

    /// Set a student's academic record
    pub async fn set_academics(
        &self,
        student_id: &str,
        gpa: f64,
        backlogs: u32,
        skills: &[&str],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let profile = state
            .account_mut(student_id)
            .and_then(|a| a.profile.as_mut())
            .ok_or_else(|| PortalError::NotFound("Student profile not found".to_string()))?;
        profile.gpa = gpa;
        profile.backlogs = backlogs;
        profile.skills = skills.iter().map(|s| s.to_string()).collect();
        Ok(())
    }

    /// Invalidate a token as if it had expired server-side
    pub async fn revoke_token(&self, token: &str) -> bool {
        self.state.write().await.tokens.remove(token).is_some()
    }

    /// Current approval status of an account
    pub async fn account_status(&self, user_id: &str) -> Option<AccountStatus> {
        self.state.read().await.account(user_id).map(|a| a.user.status)
    }

    /// Find an account id by email
    pub async fn user_id_by_email(&self, email: &str) -> Option<String> {
        self.state
            .read()
            .await
            .account_by_email(email)
            .map(|a| a.user.id.clone())
    }

    /// Number of stored applications
    pub async fn application_count(&self) -> usize {
        self.state.read().await.applications.len()
    }

    async fn resolve_student(
        &self,
        token: &str,
        student_id: &str,
        decision: AccountStatus,
    ) -> Result<Option<String>> {
        let mut state = self.state.write().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Tpo)?;

        let account = state
            .account_mut(student_id)
            .filter(|a| a.user.role == Role::Student)
            .ok_or_else(|| PortalError::NotFound(format!("Student {} not found", student_id)))?;
        if account.user.status.is_resolved() {
            return Err(PortalError::AlreadyResolved(student_id.to_string()));
        }
        account.user.status = decision;
        let name = account.user.name.clone();

        let (kind, message) = match decision {
            AccountStatus::Active => ("approval", "Your account has been approved. You can now log in."),
            _ => ("rejection", "Your registration has been rejected."),
        };
        state.notify(student_id, kind, message.to_string());
        tracing::info!("Student {} ({}) resolved as {}", name, student_id, decision);

        Ok(Some(match decision {
            AccountStatus::Active => "Student approved".to_string(),
            _ => "Student rejected".to_string(),
        }))
    }
}

#[async_trait]
impl PlacementBackend for InMemoryBackend {
    async fn register(&self, input: &RegisterInput) -> Result<Option<String>> {
        let user = self
            .add_account(
                input.name.trim(),
                &input.email,
                &input.password,
                Role::Student,
                AccountStatus::PendingApproval,
            )
            .await?;

        let mut state = self.state.write().await;
        if let Some(profile) = state.account_mut(&user.id).and_then(|a| a.profile.as_mut()) {
            profile.department = input.department.trim().to_string();
            profile.roll_number = input.roll_number.trim().to_string();
        }
        Ok(Some(REGISTERED_MESSAGE.to_string()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant> {
        let mut state = self.state.write().await;
        let account = state
            .account_by_email(email)
            .cloned()
            .ok_or(PortalError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(PortalError::InvalidCredentials);
        }
        match account.user.status {
            AccountStatus::PendingApproval => return Err(PortalError::AccountPending),
            AccountStatus::Rejected => return Err(PortalError::AccountRejected),
            AccountStatus::Active => {}
        }

        let token = Uuid::new_v4().simple().to_string();
        state.tokens.insert(token.clone(), account.user.id.clone());
        Ok(LoginGrant {
            token,
            user: account.user,
        })
    }

    async fn me(&self, token: &str) -> Result<User> {
        self.state.read().await.caller(token)
    }

    async fn logout(&self, token: &str) -> Result<()> {
        match self.state.write().await.tokens.remove(token) {
            Some(_) => Ok(()),
            None => Err(PortalError::SessionExpired),
        }
    }

    async fn pending_students(&self, token: &str) -> Result<Vec<PendingStudent>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Tpo)?;

        Ok(state
            .accounts
            .iter()
            .filter(|a| a.user.role == Role::Student && a.user.status == AccountStatus::PendingApproval)
            .map(|a| {
                let (department, roll_number) = a
                    .profile
                    .as_ref()
                    .map(|p| (p.department.clone(), p.roll_number.clone()))
                    .unwrap_or_default();
                PendingStudent {
                    id: a.user.id.clone(),
                    name: a.user.name.clone(),
                    email: a.user.email.clone(),
                    department,
                    roll_number,
                    status: a.user.status,
                    created_at: a.created_at.clone(),
                }
            })
            .collect())
    }

    async fn approve_student(&self, token: &str, student_id: &str) -> Result<Option<String>> {
        self.resolve_student(token, student_id, AccountStatus::Active).await
    }

    async fn reject_student(&self, token: &str, student_id: &str) -> Result<Option<String>> {
        self.resolve_student(token, student_id, AccountStatus::Rejected).await
    }

    async fn eligible_drives(&self, token: &str) -> Result<Vec<Drive>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Student)?;
        state.drives_for_student(&caller)
    }

    async fn recommended_drives(&self, token: &str) -> Result<Vec<Drive>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Student)?;
        let profile = state.profile_of(&caller.id)?;

        let mut drives: Vec<Drive> = state
            .drives_for_student(&caller)?
            .into_iter()
            .map(|mut d| {
                d.recommendation_score = Some(d.skill_overlap(&profile));
                d
            })
            .collect();
        drives.sort_by(|a, b| {
            b.recommendation_score
                .unwrap_or_default()
                .total_cmp(&a.recommendation_score.unwrap_or_default())
        });
        Ok(drives)
    }

    async fn apply(&self, token: &str, drive_id: &str) -> Result<Option<String>> {
        let mut state = self.state.write().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Student)?;

        let drive = state.drive(drive_id)?.clone();
        if state.applications.iter().any(|a| a.is_for(&caller.id, drive_id)) {
            return Err(PortalError::Conflict("Already applied to this drive".to_string()));
        }
        let profile = state.profile_of(&caller.id)?;
        if let Some(reason) = drive.ineligibility_reason(&profile) {
            return Err(PortalError::Forbidden(format!("Not eligible: {}", reason)));
        }

        let application = Application::new(Uuid::new_v4().to_string(), &caller.id, drive_id);
        tracing::debug!("Application {} created for drive {}", application.id, drive_id);
        state.applications.push(application);
        state.notify(
            &caller.id,
            "application",
            format!("You applied to {} for {}", drive.company_name, drive.job_role),
        );
        Ok(Some("Application submitted".to_string()))
    }

    async fn student_applications(&self, token: &str) -> Result<Vec<Application>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Student)?;

        Ok(state
            .applications
            .iter()
            .filter(|a| a.student_id == caller.id)
            .cloned()
            .map(|a| state.with_drive(a))
            .collect())
    }

    async fn drive_applications(&self, token: &str, drive_id: &str) -> Result<Vec<Application>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_staff(&caller)?;
        state.drive(drive_id)?;
        state.ensure_manages(&caller, drive_id)?;

        Ok(state
            .applications
            .iter()
            .filter(|a| a.drive_id == drive_id)
            .cloned()
            .map(|a| state.with_student(a))
            .collect())
    }

    async fn all_applications(&self, token: &str) -> Result<Vec<Application>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Tpo)?;

        Ok(state
            .applications
            .iter()
            .cloned()
            .map(|a| state.with_student(state.with_drive(a)))
            .collect())
    }

    async fn update_application_status(
        &self,
        token: &str,
        application_id: &str,
        from: PlacementStatus,
        status: PlacementStatus,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let caller = state.caller(token)?;
        require_staff(&caller)?;

        let application = state
            .applications
            .iter()
            .find(|a| a.id == application_id)
            .cloned()
            .ok_or_else(|| PortalError::NotFound(format!("Application {} not found", application_id)))?;
        state.ensure_manages(&caller, &application.drive_id)?;

        let current = application.status;
        if status == PlacementStatus::NotApplied {
            return Err(PortalError::Validation(
                "NOT_APPLIED cannot be set on an application".to_string(),
            ));
        }
        if current != from {
            return Err(PortalError::Conflict(format!(
                "Application is already {}",
                current
            )));
        }
        if !current.transition_allowed(caller.role, status) {
            return Err(PortalError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        if let Some(stored) = state.applications.iter_mut().find(|a| a.id == application_id) {
            stored.status = status;
        }
        let company = state
            .drive(&application.drive_id)
            .map(|d| d.company_name.clone())
            .unwrap_or_default();
        state.notify(
            &application.student_id,
            "status",
            format!("Your application to {} is now {}", company, status),
        );
        tracing::info!(
            "Application {} moved {} -> {} by {}",
            application_id,
            current,
            status,
            caller.id
        );
        Ok(())
    }

    async fn schedule_interview(&self, token: &str, request: &InterviewRequest) -> Result<String> {
        let mut state = self.state.write().await;
        let caller = state.caller(token)?;
        require_staff(&caller)?;
        state.ensure_manages(&caller, &request.company_id)?;

        let application = state
            .applications
            .iter()
            .find(|a| a.is_for(&request.student_id, &request.company_id))
            .ok_or_else(|| PortalError::NotFound("Application not found".to_string()))?;
        if application.status != PlacementStatus::Shortlisted {
            return Err(PortalError::NotSchedulable(application.status));
        }
        if state
            .interviews
            .iter()
            .any(|i| i.student_id == request.student_id && i.drive_id == request.company_id)
        {
            return Err(PortalError::Conflict("Interview already scheduled".to_string()));
        }

        let interview = Interview {
            id: Uuid::new_v4().to_string(),
            student_id: request.student_id.clone(),
            drive_id: request.company_id.clone(),
            interview_date: request.interview_date.clone(),
            interview_time: request.interview_time.clone(),
            mode: request.mode,
        };
        let id = interview.id.clone();
        state.interviews.push(interview);
        state.notify(
            &request.student_id,
            "interview",
            format!(
                "Interview scheduled on {} at {} ({})",
                request.interview_date, request.interview_time, request.mode
            ),
        );
        Ok(id)
    }

    async fn my_interviews(&self, token: &str) -> Result<Vec<Interview>> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;
        require_role(&caller, Role::Student)?;

        Ok(state
            .interviews
            .iter()
            .filter(|i| i.student_id == caller.id)
            .cloned()
            .collect())
    }

    async fn notifications(&self, token: &str) -> Result<NotificationFeed> {
        let state = self.state.read().await;
        let caller = state.caller(token)?;

        let mut notifications: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == caller.id)
            .cloned()
            .collect();
        notifications.reverse();
        let unread_count = notifications.iter().filter(|n| !n.read).count() as u64;
        Ok(NotificationFeed {
            notifications,
            unread_count,
        })
    }

    async fn mark_notification_read(&self, token: &str, notification_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let caller = state.caller(token)?;

        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == caller.id)
            .ok_or_else(|| PortalError::NotFound(format!("Notification {} not found", notification_id)))?;
        notification.read = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(id: &str, min_gpa: f64, skills: &[&str], date: &str) -> Drive {
        Drive {
            id: id.to_string(),
            company_name: format!("Company {}", id),
            job_role: "Engineer".to_string(),
            min_gpa,
            allowed_backlogs: 0,
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            drive_date: date.to_string(),
            recruiter_id: None,
            already_applied: false,
            recommendation_score: None,
        }
    }

    async fn login(backend: &InMemoryBackend, email: &str) -> String {
        backend.login(email, "secret1").await.unwrap().token
    }

    /// TPO, recruiter assigned to d1, and an active student with an application to d1
    async fn fixture() -> (InMemoryBackend, String, String, String, String) {
        let backend = InMemoryBackend::new();
        backend
            .add_account("Tara", "tpo@campus.edu", "secret1", Role::Tpo, AccountStatus::Active)
            .await
            .unwrap();
        let recruiter = backend
            .add_account("Rick", "rec@acme.com", "secret1", Role::Recruiter, AccountStatus::Active)
            .await
            .unwrap();
        let student = backend
            .add_account("Sam", "sam@campus.edu", "secret1", Role::Student, AccountStatus::Active)
            .await
            .unwrap();
        backend.add_drive(drive("d1", 7.0, &["rust"], "2026-11-01")).await;
        backend.add_drive(drive("d2", 6.0, &[], "2026-11-05")).await;
        backend.assign_drive(&recruiter.id, "d1").await.unwrap();
        backend.set_academics(&student.id, 8.2, 0, &["Rust"]).await.unwrap();

        let student_token = login(&backend, "sam@campus.edu").await;
        backend.apply(&student_token, "d1").await.unwrap();
        let app_id = backend.student_applications(&student_token).await.unwrap()[0].id.clone();

        let tpo_token = login(&backend, "tpo@campus.edu").await;
        let rec_token = login(&backend, "rec@acme.com").await;
        (backend, tpo_token, rec_token, student_token, app_id)
    }

    #[tokio::test]
    async fn test_register_then_login_is_pending() {
        let backend = InMemoryBackend::new();
        let input = RegisterInput::new("Sam", "Sam@Campus.edu", "secret1", "CSE", "21CS001");
        let message = backend.register(&input).await.unwrap();
        assert_eq!(message.as_deref(), Some(REGISTERED_MESSAGE));

        let err = backend.login("sam@campus.edu", "secret1").await.unwrap_err();
        assert!(matches!(err, PortalError::AccountPending));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let backend = InMemoryBackend::new();
        let input = RegisterInput::new("Sam", "sam@campus.edu", "secret1", "CSE", "21CS001");
        backend.register(&input).await.unwrap();
        let err = backend.register(&input).await.unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_refusals() {
        let backend = InMemoryBackend::new();
        backend
            .add_account("R", "r@campus.edu", "secret1", Role::Student, AccountStatus::Rejected)
            .await
            .unwrap();

        assert!(matches!(
            backend.login("r@campus.edu", "secret1").await.unwrap_err(),
            PortalError::AccountRejected
        ));
        assert!(matches!(
            backend.login("r@campus.edu", "wrong-pass").await.unwrap_err(),
            PortalError::InvalidCredentials
        ));
        assert!(matches!(
            backend.login("nobody@campus.edu", "secret1").await.unwrap_err(),
            PortalError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_is_expired() {
        let (backend, _, _, student_token, _) = fixture().await;
        assert!(backend.revoke_token(&student_token).await);
        assert!(matches!(
            backend.me(&student_token).await.unwrap_err(),
            PortalError::SessionExpired
        ));
    }

    #[tokio::test]
    async fn test_approval_is_one_shot() {
        let (backend, tpo_token, _, student_token, _) = fixture().await;
        let input = RegisterInput::new("New", "new@campus.edu", "secret1", "ECE", "21EC010");
        backend.register(&input).await.unwrap();
        let id = backend.user_id_by_email("new@campus.edu").await.unwrap();

        assert!(matches!(
            backend.approve_student(&student_token, &id).await.unwrap_err(),
            PortalError::Forbidden(_)
        ));
        assert_eq!(backend.pending_students(&tpo_token).await.unwrap().len(), 1);

        backend.approve_student(&tpo_token, &id).await.unwrap();
        assert_eq!(backend.account_status(&id).await, Some(AccountStatus::Active));
        assert!(matches!(
            backend.reject_student(&tpo_token, &id).await.unwrap_err(),
            PortalError::AlreadyResolved(_)
        ));
        assert!(backend.pending_students(&tpo_token).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_rules() {
        let (backend, tpo_token, _, student_token, _) = fixture().await;

        let err = backend.apply(&student_token, "d1").await.unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
        assert!(matches!(
            backend.apply(&tpo_token, "d2").await.unwrap_err(),
            PortalError::Forbidden(_)
        ));
        assert!(matches!(
            backend.apply(&student_token, "missing").await.unwrap_err(),
            PortalError::NotFound(_)
        ));

        backend.add_drive(drive("d3", 9.5, &[], "2026-12-01")).await;
        assert!(matches!(
            backend.apply(&student_token, "d3").await.unwrap_err(),
            PortalError::Forbidden(_)
        ));
        assert_eq!(backend.application_count().await, 1);
    }

    #[tokio::test]
    async fn test_listings_flag_applied_and_rank() {
        let (backend, _, _, student_token, _) = fixture().await;

        let eligible = backend.eligible_drives(&student_token).await.unwrap();
        assert_eq!(eligible.len(), 2);
        assert!(eligible.iter().find(|d| d.id == "d1").unwrap().already_applied);
        assert!(!eligible.iter().find(|d| d.id == "d2").unwrap().already_applied);

        let recommended = backend.recommended_drives(&student_token).await.unwrap();
        assert!(recommended.iter().all(|d| d.recommendation_score == Some(1.0)));
    }

    #[tokio::test]
    async fn test_recruiter_limited_to_assigned_drives() {
        let (backend, tpo_token, rec_token, student_token, app_id) = fixture().await;
        backend.apply(&student_token, "d2").await.unwrap();

        assert!(matches!(
            backend.drive_applications(&rec_token, "d2").await.unwrap_err(),
            PortalError::Forbidden(_)
        ));
        assert_eq!(backend.drive_applications(&rec_token, "d1").await.unwrap().len(), 1);
        assert_eq!(backend.all_applications(&tpo_token).await.unwrap().len(), 2);

        backend
            .update_application_status(&rec_token, &app_id, PlacementStatus::Applied, PlacementStatus::Shortlisted)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_table_enforced() {
        let (backend, tpo_token, _, student_token, app_id) = fixture().await;

        assert!(matches!(
            backend
                .update_application_status(&student_token, &app_id, PlacementStatus::Applied, PlacementStatus::Shortlisted)
                .await
                .unwrap_err(),
            PortalError::Forbidden(_)
        ));
        assert!(matches!(
            backend
                .update_application_status(&tpo_token, &app_id, PlacementStatus::Applied, PlacementStatus::Selected)
                .await
                .unwrap_err(),
            PortalError::InvalidTransition { .. }
        ));

        backend
            .update_application_status(&tpo_token, &app_id, PlacementStatus::Applied, PlacementStatus::Shortlisted)
            .await
            .unwrap();
        // A second operator working from the old APPLIED view
        assert!(matches!(
            backend
                .update_application_status(&tpo_token, &app_id, PlacementStatus::Applied, PlacementStatus::Shortlisted)
                .await
                .unwrap_err(),
            PortalError::Conflict(_)
        ));
        backend
            .update_application_status(&tpo_token, &app_id, PlacementStatus::Shortlisted, PlacementStatus::Rejected)
            .await
            .unwrap();
        assert!(matches!(
            backend
                .update_application_status(&tpo_token, &app_id, PlacementStatus::Shortlisted, PlacementStatus::Interviewed)
                .await
                .unwrap_err(),
            PortalError::Conflict(_)
        ));
        // Up to date, but nothing leaves REJECTED
        assert!(matches!(
            backend
                .update_application_status(&tpo_token, &app_id, PlacementStatus::Rejected, PlacementStatus::Selected)
                .await
                .unwrap_err(),
            PortalError::InvalidTransition {
                from: PlacementStatus::Rejected,
                to: PlacementStatus::Selected
            }
        ));
    }

    #[tokio::test]
    async fn test_interview_requires_shortlist() {
        let (backend, tpo_token, _, student_token, app_id) = fixture().await;
        let student_id = backend.user_id_by_email("sam@campus.edu").await.unwrap();
        let request = InterviewRequest {
            student_id,
            company_id: "d1".to_string(),
            interview_date: "2026-11-10".to_string(),
            interview_time: "10:30".to_string(),
            mode: crate::models::InterviewMode::Online,
        };

        assert!(matches!(
            backend.schedule_interview(&tpo_token, &request).await.unwrap_err(),
            PortalError::NotSchedulable(PlacementStatus::Applied)
        ));
        backend
            .update_application_status(&tpo_token, &app_id, PlacementStatus::Applied, PlacementStatus::Shortlisted)
            .await
            .unwrap();
        backend.schedule_interview(&tpo_token, &request).await.unwrap();
        assert!(matches!(
            backend.schedule_interview(&tpo_token, &request).await.unwrap_err(),
            PortalError::Conflict(_)
        ));
        assert_eq!(backend.my_interviews(&student_token).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notifications_mark_read() {
        let (backend, _, _, student_token, _) = fixture().await;
        let feed = backend.notifications(&student_token).await.unwrap();
        assert_eq!(feed.unread_count, 1);

        let id = feed.notifications[0].id.clone();
        backend.mark_notification_read(&student_token, &id).await.unwrap();
        backend.mark_notification_read(&student_token, &id).await.unwrap();
        assert_eq!(backend.notifications(&student_token).await.unwrap().unread_count, 0);
    }
}
