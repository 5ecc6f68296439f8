//! Drive and student profile models
//!
//! Drives are owned by the backend; the core only reads them to test
//! eligibility and to decide which applications a recruiter may touch.

use serde::{Deserialize, Serialize};

use super::application::PlacementStatus;

/// A company's recruitment round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    /// Unique identifier (`company_id` in application payloads)
    pub id: String,
    /// Company name
    pub company_name: String,
    /// Job role offered
    #[serde(rename = "role")]
    pub job_role: String,
    /// Minimum GPA required
    pub min_gpa: f64,
    /// Maximum number of active backlogs allowed
    pub allowed_backlogs: u32,
    /// Skills the company is looking for (ranking only)
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Date of the drive
    #[serde(default)]
    pub drive_date: String,
    /// Recruiter assigned to the drive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_id: Option<String>,
    /// Set by the backend when listing drives for a student
    #[serde(default)]
    pub already_applied: bool,
    /// Set by the backend on recommended listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_score: Option<f64>,
}

impl Drive {
    /// Hard eligibility: GPA and backlog limits
    pub fn is_eligible(&self, profile: &StudentProfile) -> bool {
        profile.gpa >= self.min_gpa && profile.backlogs <= self.allowed_backlogs
    }

    /// Explain why a student is not eligible, if they are not
    pub fn ineligibility_reason(&self, profile: &StudentProfile) -> Option<String> {
        if profile.gpa < self.min_gpa {
            return Some(format!(
                "GPA {:.2} is below the required {:.2}",
                profile.gpa, self.min_gpa
            ));
        }
        if profile.backlogs > self.allowed_backlogs {
            return Some(format!(
                "{} backlogs exceed the allowed {}",
                profile.backlogs, self.allowed_backlogs
            ));
        }
        None
    }

    /// Fraction of required skills the student has, case-insensitive.
    ///
    /// A drive without required skills matches everyone fully.
    pub fn skill_overlap(&self, profile: &StudentProfile) -> f64 {
        if self.required_skills.is_empty() {
            return 1.0;
        }
        let matched = self
            .required_skills
            .iter()
            .filter(|skill| {
                profile
                    .skills
                    .iter()
                    .any(|s| s.trim().eq_ignore_ascii_case(skill.trim()))
            })
            .count();
        matched as f64 / self.required_skills.len() as f64
    }
}

/// Academic profile of a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub roll_number: String,
    pub gpa: f64,
    pub backlogs: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub placement_status: PlacementStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(min_gpa: f64, allowed_backlogs: u32, skills: &[&str]) -> Drive {
        Drive {
            id: "d1".to_string(),
            company_name: "Acme".to_string(),
            job_role: "Engineer".to_string(),
            min_gpa,
            allowed_backlogs,
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            drive_date: "2026-11-01".to_string(),
            recruiter_id: None,
            already_applied: false,
            recommendation_score: None,
        }
    }

    fn profile(gpa: f64, backlogs: u32, skills: &[&str]) -> StudentProfile {
        StudentProfile {
            id: "p1".to_string(),
            user_id: "s1".to_string(),
            name: "Student".to_string(),
            department: "CSE".to_string(),
            roll_number: "CS001".to_string(),
            gpa,
            backlogs,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            placement_status: PlacementStatus::NotApplied,
        }
    }

    #[test]
    fn test_eligible_within_limits() {
        let d = drive(7.0, 2, &[]);
        assert!(d.is_eligible(&profile(7.5, 1, &[])));
        assert!(d.is_eligible(&profile(7.0, 2, &[])));
        assert!(d.ineligibility_reason(&profile(7.5, 1, &[])).is_none());
    }

    #[test]
    fn test_ineligible_gpa_or_backlogs() {
        let d = drive(7.0, 2, &[]);
        assert!(!d.is_eligible(&profile(6.9, 0, &[])));
        assert!(!d.is_eligible(&profile(9.0, 3, &[])));
        assert!(d.ineligibility_reason(&profile(6.9, 0, &[])).unwrap().contains("GPA"));
        assert!(d.ineligibility_reason(&profile(9.0, 3, &[])).unwrap().contains("backlogs"));
    }

    #[test]
    fn test_skills_do_not_gate_eligibility() {
        let d = drive(6.0, 0, &["rust", "sql"]);
        let p = profile(8.0, 0, &["python"]);
        assert!(d.is_eligible(&p));
        assert_eq!(d.skill_overlap(&p), 0.0);
    }

    #[test]
    fn test_skill_overlap_case_insensitive() {
        let d = drive(6.0, 0, &["Rust", "SQL"]);
        assert_eq!(d.skill_overlap(&profile(8.0, 0, &["rust"])), 0.5);
        assert_eq!(d.skill_overlap(&profile(8.0, 0, &["sql ", "RUST"])), 1.0);
        assert_eq!(drive(6.0, 0, &[]).skill_overlap(&profile(8.0, 0, &[])), 1.0);
    }

    #[test]
    fn test_drive_wire_names() {
        let json = r#"{"id":"d1","company_name":"Acme","role":"SDE","min_gpa":7.0,"allowed_backlogs":1}"#;
        let d: Drive = serde_json::from_str(json).unwrap();
        assert_eq!(d.job_role, "SDE");
        assert!(!d.already_applied);
        assert!(d.required_skills.is_empty());
    }
}
