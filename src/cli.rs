//! Command-line front end
//!
//! Thin layer over the library: parse a command, run it against the
//! restored session, print the result.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use placement_portal::{
    backend::PlacementBackend,
    error::{PortalError, Result},
    models::{Application, InterviewSlot, PlacementStatus, PlacementSummary, RegisterInput, Role},
    routing::{self, nav_links, Access},
    services::{
        available_actions, AccountApproval, ApplicationWorkflow, NotificationCenter, SessionManager,
    },
};

#[derive(Parser)]
#[command(name = "placement")]
#[command(about = "Campus placement portal client", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, default_value = "placement.yml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a student account (pending TPO approval)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        roll_number: String,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Show where a path leads for the current session
    Route { path: String },
    /// List eligible drives
    Drives {
        /// Order by recommendation score
        #[arg(long)]
        recommended: bool,
    },
    /// Apply to a drive
    Apply { drive_id: String },
    /// List applications (own for students, all for the TPO)
    Applications,
    /// List applications for a drive
    DriveApplications { drive_id: String },
    /// Move an application to a new status
    Status {
        #[arg(long)]
        drive: String,
        application_id: String,
        status: PlacementStatus,
    },
    /// Schedule an interview for a shortlisted application
    Interview {
        #[arg(long)]
        drive: String,
        application_id: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "online")]
        mode: String,
    },
    /// List accounts awaiting approval
    Pending,
    /// Approve a pending account
    Approve { account_id: String },
    /// Reject a pending account
    Reject { account_id: String },
    /// Show notifications
    Notifications,
    /// Mark a notification read
    Read { notification_id: String },
}

/// Services wired to one session manager
pub struct App {
    sessions: Arc<SessionManager>,
    workflow: ApplicationWorkflow,
    approval: AccountApproval,
    notifications: NotificationCenter,
}

impl App {
    pub fn new(backend: Arc<dyn PlacementBackend>, sessions: Arc<SessionManager>) -> Self {
        Self {
            workflow: ApplicationWorkflow::new(backend.clone(), sessions.clone()),
            approval: AccountApproval::new(backend.clone(), sessions.clone()),
            notifications: NotificationCenter::new(backend, sessions.clone()),
            sessions,
        }
    }

    /// Guard a command the way the matching view is guarded
    fn require(&self, roles: &[Role]) -> Result<()> {
        match self.sessions.authorize(roles) {
            Access::Allow => Ok(()),
            Access::RedirectToOwnArea(path) => Err(PortalError::Forbidden(format!(
                "Not available for your role (your area is {})",
                path
            ))),
            Access::Pending | Access::RedirectToLogin => Err(PortalError::NotAuthenticated),
        }
    }

    async fn staff_application(&self, drive_id: &str, application_id: &str) -> Result<Application> {
        self.workflow
            .drive_applications(drive_id)
            .await?
            .into_iter()
            .find(|a| a.id == application_id)
            .ok_or_else(|| PortalError::NotFound(format!("Application {} not found", application_id)))
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Register {
                name,
                email,
                password,
                department,
                roll_number,
            } => {
                let input = RegisterInput::new(name, email, password, department, roll_number);
                println!("{}", self.sessions.register(input).await?);
            }
            Commands::Login { email, password } => {
                let session = self.sessions.login(&email, &password).await?;
                println!(
                    "Logged in as {} ({}) - {}",
                    session.user().name,
                    session.role(),
                    session.role().portal_label()
                );
                println!("Landing page: {}", routing::default_landing_route(session.role()));
            }
            Commands::Logout => {
                self.sessions.logout().await?;
                println!("Logged out");
            }
            Commands::Whoami => match self.sessions.current() {
                Some(session) => {
                    let user = session.user();
                    println!("{} <{}>", user.name, user.email);
                    println!("Role: {} ({})", session.role(), session.role().portal_label());
                    for link in nav_links(session.role()) {
                        println!("  {:<20} {}", link.label, link.path);
                    }
                }
                None => println!("Not logged in"),
            },
            Commands::Route { path } => {
                match routing::resolve(&path, &self.sessions.state()) {
                    Access::Allow => println!("{} renders", path),
                    Access::Pending => println!("{} waits for session restore", path),
                    other => {
                        if let Some(target) = other.redirect_target() {
                            println!("{} redirects to {}", path, target);
                        }
                    }
                }
            }
            Commands::Drives { recommended } => {
                self.require(&[Role::Student])?;
                let drives = if recommended {
                    self.workflow.recommended_drives().await?
                } else {
                    self.workflow.eligible_drives().await?
                };
                for drive in drives {
                    let score = drive
                        .recommendation_score
                        .map(|s| format!(" score={:.2}", s))
                        .unwrap_or_default();
                    let applied = if drive.already_applied { " [applied]" } else { "" };
                    println!(
                        "{}  {} - {}  (min GPA {:.1}, backlogs <= {}, {}){}{}",
                        drive.id,
                        drive.company_name,
                        drive.job_role,
                        drive.min_gpa,
                        drive.allowed_backlogs,
                        drive.drive_date,
                        score,
                        applied
                    );
                }
            }
            Commands::Apply { drive_id } => {
                self.require(&[Role::Student])?;
                let drive = self
                    .workflow
                    .eligible_drives()
                    .await?
                    .into_iter()
                    .find(|d| d.id == drive_id)
                    .ok_or_else(|| {
                        PortalError::NotFound(format!("Drive {} is not open to you", drive_id))
                    })?;
                let existing = self.workflow.student_applications().await?;
                println!("{}", self.workflow.apply(&drive, &existing).await?);
            }
            Commands::Applications => {
                self.require(&[Role::Student, Role::Tpo])?;
                let applications = match self.sessions.current().map(|s| s.role()) {
                    Some(Role::Student) => self.workflow.student_applications().await?,
                    _ => self.workflow.all_applications().await?,
                };
                for application in &applications {
                    let company = application
                        .company
                        .as_ref()
                        .map(|d| d.company_name.as_str())
                        .unwrap_or(application.drive_id.as_str());
                    println!("{}  {:<24} {}", application.id, company, application.status);
                }
                let summary = PlacementSummary::from_applications(&applications);
                println!(
                    "total={} shortlisted={} interviewed={} selected={} rejected={}",
                    summary.total,
                    summary.shortlisted,
                    summary.interviewed,
                    summary.selected,
                    summary.rejected
                );
            }
            Commands::DriveApplications { drive_id } => {
                self.require(&[Role::Tpo, Role::Recruiter])?;
                let session = self.sessions.current().ok_or(PortalError::NotAuthenticated)?;
                for application in self.workflow.drive_applications(&drive_id).await? {
                    let student = application
                        .student
                        .as_ref()
                        .map(|s| format!("{} ({}, GPA {:.2})", s.name, s.roll_number, s.gpa))
                        .unwrap_or_else(|| application.student_id.clone());
                    let actions: Vec<&str> = available_actions(&session, &application)
                        .iter()
                        .map(|a| a.label())
                        .collect();
                    println!(
                        "{}  {:<40} {:<12} [{}]",
                        application.id,
                        student,
                        application.status,
                        actions.join(", ")
                    );
                }
            }
            Commands::Status {
                drive,
                application_id,
                status,
            } => {
                self.require(&[Role::Tpo, Role::Recruiter])?;
                let application = self.staff_application(&drive, &application_id).await?;
                let updated = self.workflow.update_status(&application, status).await?;
                println!("{} is now {}", updated.id, updated.status);
            }
            Commands::Interview {
                drive,
                application_id,
                date,
                time,
                mode,
            } => {
                self.require(&[Role::Tpo, Role::Recruiter])?;
                let slot = InterviewSlot::parse(&date, &time, &mode)
                    .map_err(|e| PortalError::Validation(e.to_string()))?;
                let application = self.staff_application(&drive, &application_id).await?;
                let id = self.workflow.schedule_interview(&application, &slot).await?;
                println!("Interview {} scheduled", id);
            }
            Commands::Pending => {
                self.require(&[Role::Tpo])?;
                for student in self.approval.pending_accounts().await? {
                    println!(
                        "{}  {} <{}>  {} {}  registered {}",
                        student.id,
                        student.name,
                        student.email,
                        student.department,
                        student.roll_number,
                        student.created_at
                    );
                }
            }
            Commands::Approve { account_id } => {
                self.require(&[Role::Tpo])?;
                println!("{}", self.approval.approve(&account_id).await?);
            }
            Commands::Reject { account_id } => {
                self.require(&[Role::Tpo])?;
                println!("{}", self.approval.reject(&account_id).await?);
            }
            Commands::Notifications => {
                self.require(&[])?;
                let feed = self.notifications.feed().await?;
                println!("{} unread", feed.unread_count);
                for n in feed.notifications {
                    let marker = if n.read { " " } else { "*" };
                    println!("{} {}  {}  {}", marker, n.id, n.created_at, n.message);
                }
            }
            Commands::Read { notification_id } => {
                self.require(&[])?;
                self.notifications.mark_read(&notification_id).await?;
                println!("Marked {} read", notification_id);
            }
        }
        Ok(())
    }
}
