use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub company_id: ObjectId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default = "default_open")]
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub company_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub remote: Option<bool>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub employment_type: EmploymentType,
    pub remote: bool,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        JobView {
            id: job.id.to_hex(),
            company_id: job.company_id.to_hex(),
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            employment_type: job.employment_type,
            remote: job.remote,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            is_open: job.is_open,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Accepted and rejected are final.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Reviewing) | (Pending, Accepted) | (Pending, Rejected) | (Reviewing, Accepted) | (Reviewing, Rejected)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub job_id: ObjectId,
    pub company_id: ObjectId,
    pub applicant_id: ObjectId,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: String,
    pub job_id: String,
    pub company_id: String,
    pub applicant_id: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationView {
    fn from(application: Application) -> Self {
        ApplicationView {
            id: application.id.to_hex(),
            job_id: application.job_id.to_hex(),
            company_id: application.company_id.to_hex(),
            applicant_id: application.applicant_id.to_hex(),
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            status: application.status,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_statuses_do_not_move() {
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Reviewing));
        assert!(ApplicationStatus::Reviewing.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Accepted.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Rejected.can_transition_to(ApplicationStatus::Pending));
        assert!(!ApplicationStatus::Reviewing.can_transition_to(ApplicationStatus::Pending));
    }

    #[test]
    fn employment_type_wire_names() {
        let request: JobRequest =
            serde_json::from_str(r#"{"title":"Dev","employmentType":"part_time"}"#).unwrap();
        assert_eq!(request.employment_type, Some(EmploymentType::PartTime));
    }
}
