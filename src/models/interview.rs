//! Interview and notification models

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an interview is conducted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    Online,
    Offline,
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterviewMode::Online => write!(f, "online"),
            InterviewMode::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for InterviewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(InterviewMode::Online),
            "offline" => Ok(InterviewMode::Offline),
            _ => Err(anyhow::anyhow!("Invalid interview mode: {}", s)),
        }
    }
}

/// Interview record, keyed by (student, drive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub student_id: String,
    #[serde(rename = "company_id")]
    pub drive_id: String,
    pub interview_date: String,
    pub interview_time: String,
    pub mode: InterviewMode,
}

/// When and how an interview should take place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterviewSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub mode: InterviewMode,
}

impl InterviewSlot {
    /// Parse a slot from `YYYY-MM-DD`, `HH:MM` and a mode name
    pub fn parse(date: &str, time: &str, mode: &str) -> anyhow::Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid interview date '{}': {}", date, e))?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|e| anyhow::anyhow!("Invalid interview time '{}': {}", time, e))?;
        Ok(Self {
            date,
            time,
            mode: mode.parse()?,
        })
    }
}

/// Wire body of `POST /interviews`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub student_id: String,
    pub company_id: String,
    pub interview_date: String,
    pub interview_time: String,
    pub mode: InterviewMode,
}

impl InterviewRequest {
    /// Build the request body for a (student, drive) pair
    pub fn new(student_id: &str, drive_id: &str, slot: &InterviewSlot) -> Self {
        Self {
            student_id: student_id.to_string(),
            company_id: drive_id.to_string(),
            interview_date: slot.date.format("%Y-%m-%d").to_string(),
            interview_time: slot.time.format("%H:%M").to_string(),
            mode: slot.mode,
        }
    }
}

/// In-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub read: bool,
    #[serde(default)]
    pub created_at: String,
}

/// Notifications plus the backend's unread counter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationFeed {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: u64,
}
