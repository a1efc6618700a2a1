use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::job::model::{Application, ApplicationStatus, ApplyRequest, Job, JobRequest};
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::validation::{optional_text, require_text, validate_url};

const DUPLICATE_KEY: i32 = 11000;

pub struct JobService {
    jobs: Collection<Job>,
    applications: Collection<Application>,
}

fn check_salary(min: Option<i64>, max: Option<i64>) -> Result<(), CustomError> {
    if min.is_some_and(|v| v < 0) || max.is_some_and(|v| v < 0) {
        return Err(CustomError::ValidationError("Salary cannot be negative".to_string()));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(CustomError::ValidationError(
                "Minimum salary cannot exceed maximum salary".to_string(),
            ));
        }
    }
    Ok(())
}

/// Build a new open posting for `company_id` from a request.
pub fn job_from_request(company_id: ObjectId, request: &JobRequest) -> Result<Job, CustomError> {
    let title = require_text("Job title", request.title.as_deref().unwrap_or_default(), 160)?;
    let description = require_text(
        "Job description",
        request.description.as_deref().unwrap_or_default(),
        10_000,
    )?;
    check_salary(request.salary_min, request.salary_max)?;

    let now = Utc::now();
    Ok(Job {
        id: ObjectId::new(),
        company_id,
        title,
        description,
        location: optional_text("Location", request.location.as_deref(), 160)?,
        employment_type: request.employment_type.unwrap_or_default(),
        remote: request.remote.unwrap_or(false),
        salary_min: request.salary_min,
        salary_max: request.salary_max,
        is_open: request.is_open.unwrap_or(true),
        created_at: now,
        updated_at: now,
    })
}

/// `$set` document for an update, validated against the stored posting.
pub fn job_changes(current: &Job, request: &JobRequest) -> Result<Document, CustomError> {
    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    let bson_err = |e: mongodb::bson::ser::Error| CustomError::InternalServerError(e.to_string());

    if let Some(title) = &request.title {
        set.insert("title", require_text("Job title", title, 160)?);
    }
    if let Some(description) = &request.description {
        set.insert("description", require_text("Job description", description, 10_000)?);
    }
    if let Some(location) = &request.location {
        let location = optional_text("Location", Some(location), 160)?;
        set.insert("location", to_bson(&location).map_err(bson_err)?);
    }
    if let Some(kind) = request.employment_type {
        set.insert("employment_type", to_bson(&kind).map_err(bson_err)?);
    }
    if let Some(remote) = request.remote {
        set.insert("remote", remote);
    }
    if let Some(is_open) = request.is_open {
        set.insert("is_open", is_open);
    }

    let salary_min = request.salary_min.or(current.salary_min);
    let salary_max = request.salary_max.or(current.salary_max);
    check_salary(salary_min, salary_max)?;
    if let Some(min) = request.salary_min {
        set.insert("salary_min", min);
    }
    if let Some(max) = request.salary_max {
        set.insert("salary_max", max);
    }

    Ok(set)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

impl JobService {
    pub fn new(client: &Client) -> Self {
        let db = client.database(&database_name());
        JobService {
            jobs: db.collection::<Job>("jobs"),
            applications: db.collection::<Application>("applications"),
        }
    }

    pub async fn create_job(&self, job: Job) -> Result<Job, CustomError> {
        self.jobs
            .insert_one(&job)
            .await
            .map_err(|e| CustomError::database("Failed to create job", e))?;
        Ok(job)
    }

    pub async fn get_job(&self, id: &ObjectId) -> Result<Job, CustomError> {
        self.jobs
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to fetch job", e))?
            .ok_or_else(|| CustomError::NotFoundError("Job not found".to_string()))
    }

    pub async fn update_job(&self, current: &Job, request: &JobRequest) -> Result<Job, CustomError> {
        let set = job_changes(current, request)?;

        self.jobs
            .find_one_and_update(doc! { "_id": current.id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to update job", e))?
            .ok_or_else(|| CustomError::NotFoundError("Job not found".to_string()))
    }

    /// Delete a posting together with its applications
    pub async fn delete_job(&self, id: &ObjectId) -> Result<(), CustomError> {
        let result = self
            .jobs
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to delete job", e))?;
        if result.deleted_count == 0 {
            return Err(CustomError::NotFoundError("Job not found".to_string()));
        }

        self.applications
            .delete_many(doc! { "job_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to delete job applications", e))?;
        Ok(())
    }

    pub async fn jobs_for_company(&self, company_id: &ObjectId) -> Result<Vec<Job>, CustomError> {
        self.find_jobs(doc! { "company_id": company_id }, None).await
    }

    /// Newest open postings, for the feed
    pub async fn recent_open_jobs(&self, limit: u64) -> Result<Vec<Job>, CustomError> {
        self.find_jobs(doc! { "is_open": true }, Some(limit)).await
    }

    async fn find_jobs(&self, filter: Document, limit: Option<u64>) -> Result<Vec<Job>, CustomError> {
        let mut find = self.jobs.find(filter).sort(doc! { "_id": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit as i64);
        }
        let cursor = find
            .await
            .map_err(|e| CustomError::database("Failed to fetch jobs", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::database("Failed to collect jobs", e))
    }

    pub async fn apply(
        &self,
        job: &Job,
        applicant_id: ObjectId,
        request: &ApplyRequest,
    ) -> Result<Application, CustomError> {
        if !job.is_open {
            return Err(CustomError::BadRequestError(
                "This job is no longer accepting applications".to_string(),
            ));
        }

        let resume_url = optional_text("Resume URL", request.resume_url.as_deref(), 2048)?;
        if let Some(url) = &resume_url {
            validate_url(url)?;
        }

        let now = Utc::now();
        let application = Application {
            id: ObjectId::new(),
            job_id: job.id,
            company_id: job.company_id,
            applicant_id,
            cover_letter: optional_text("Cover letter", request.cover_letter.as_deref(), 5000)?,
            resume_url,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.applications
            .insert_one(&application)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    CustomError::ConflictError("You already applied to this job".to_string())
                } else {
                    CustomError::database("Failed to submit application", e)
                }
            })?;

        Ok(application)
    }

    pub async fn applications_for_company(&self, company_id: &ObjectId) -> Result<Vec<Application>, CustomError> {
        let cursor = self
            .applications
            .find(doc! { "company_id": company_id })
            .sort(doc! { "_id": -1 })
            .await
            .map_err(|e| CustomError::database("Failed to fetch applications", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::database("Failed to collect applications", e))
    }

    pub async fn get_application(&self, id: &ObjectId) -> Result<Application, CustomError> {
        self.applications
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to fetch application", e))?
            .ok_or_else(|| CustomError::NotFoundError("Application not found".to_string()))
    }

    pub async fn update_application_status(
        &self,
        application: &Application,
        status: ApplicationStatus,
    ) -> Result<Application, CustomError> {
        if !application.status.can_transition_to(status) {
            return Err(CustomError::BadRequestError(format!(
                "Cannot move application from {:?} to {:?}",
                application.status, status
            )));
        }

        let bson_err = |e: mongodb::bson::ser::Error| CustomError::InternalServerError(e.to_string());
        let previous = to_bson(&application.status).map_err(bson_err)?;
        let status = to_bson(&status).map_err(bson_err)?;

        self.applications
            .find_one_and_update(
                // Only succeeds if nobody moved it in between
                doc! { "_id": application.id, "status": previous },
                doc! { "$set": { "status": status, "updated_at": Utc::now().to_rfc3339() } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to update application", e))?
            .ok_or_else(|| CustomError::ConflictError("Application changed concurrently".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::model::EmploymentType;

    fn request() -> JobRequest {
        JobRequest {
            title: Some("Desenvolvedora Rust".into()),
            description: Some("Serviços de backend".into()),
            employment_type: Some(EmploymentType::Contract),
            salary_min: Some(8000),
            salary_max: Some(12000),
            ..Default::default()
        }
    }

    #[test]
    fn new_jobs_default_to_open() {
        let job = job_from_request(ObjectId::new(), &request()).unwrap();
        assert!(job.is_open);
        assert!(!job.remote);
        assert_eq!(job.employment_type, EmploymentType::Contract);
    }

    #[test]
    fn title_is_required() {
        let mut req = request();
        req.title = None;
        assert!(job_from_request(ObjectId::new(), &req).is_err());
    }

    #[test]
    fn salary_range_checked_against_stored_values() {
        let job = job_from_request(ObjectId::new(), &request()).unwrap();
        let update = JobRequest {
            salary_min: Some(15000),
            ..Default::default()
        };
        assert!(job_changes(&job, &update).is_err());

        let update = JobRequest {
            salary_max: Some(20000),
            is_open: Some(false),
            ..Default::default()
        };
        let set = job_changes(&job, &update).unwrap();
        assert_eq!(set.get_i64("salary_max").unwrap(), 20000);
        assert!(!set.get_bool("is_open").unwrap());
        assert!(!set.contains_key("title"));
    }
}
