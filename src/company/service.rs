use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::company::model::{Company, CompanyRequest};
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::validation::{optional_text, require_text, validate_url};

pub struct CompanyService {
    collection: Collection<Company>,
}

struct CompanyFields {
    description: Option<String>,
    website: Option<String>,
    industry: Option<String>,
    logo_url: Option<String>,
}

fn checked_fields(request: &CompanyRequest) -> Result<CompanyFields, CustomError> {
    let website = optional_text("Website", request.website.as_deref(), 2048)?;
    if let Some(url) = &website {
        validate_url(url)?;
    }
    let logo_url = optional_text("Logo URL", request.logo_url.as_deref(), 2048)?;
    if let Some(url) = &logo_url {
        validate_url(url)?;
    }
    Ok(CompanyFields {
        description: optional_text("Description", request.description.as_deref(), 5000)?,
        website,
        industry: optional_text("Industry", request.industry.as_deref(), 120)?,
        logo_url,
    })
}

/// `$set` document for the fields present in an update request.
pub fn company_changes(request: &CompanyRequest) -> Result<Document, CustomError> {
    let fields = checked_fields(request)?;
    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };

    if let Some(name) = &request.name {
        set.insert("name", require_text("Company name", name, 160)?);
    }
    let optional = [
        ("description", request.description.is_some(), fields.description),
        ("website", request.website.is_some(), fields.website),
        ("industry", request.industry.is_some(), fields.industry),
        ("logo_url", request.logo_url.is_some(), fields.logo_url),
    ];
    for (key, present, value) in optional {
        if present {
            let value = to_bson(&value).map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            set.insert(key, value);
        }
    }

    Ok(set)
}

impl CompanyService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(&database_name()).collection::<Company>("companies");
        CompanyService { collection }
    }

    pub async fn create_company(&self, admin: ObjectId, request: &CompanyRequest) -> Result<Company, CustomError> {
        let name = require_text("Company name", request.name.as_deref().unwrap_or_default(), 160)?;
        let fields = checked_fields(request)?;

        let now = Utc::now();
        let company = Company {
            id: ObjectId::new(),
            name,
            description: fields.description,
            website: fields.website,
            industry: fields.industry,
            logo_url: fields.logo_url,
            admin_ids: vec![admin],
            created_at: now,
            updated_at: now,
        };

        self.collection
            .insert_one(&company)
            .await
            .map_err(|e| CustomError::database("Failed to create company", e))?;

        Ok(company)
    }

    pub async fn get_company(&self, id: &ObjectId) -> Result<Company, CustomError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to fetch company", e))?
            .ok_or_else(|| CustomError::NotFoundError("Company not found".to_string()))
    }

    /// Fetch a company and check `user_id` may manage it
    pub async fn require_admin(&self, id: &ObjectId, user_id: &ObjectId) -> Result<Company, CustomError> {
        let company = self.get_company(id).await?;
        if !company.is_admin(user_id) {
            return Err(CustomError::ForbiddenError(
                "Only company admins can do this".to_string(),
            ));
        }
        Ok(company)
    }

    pub async fn update_company(
        &self,
        id: &ObjectId,
        user_id: &ObjectId,
        request: &CompanyRequest,
    ) -> Result<Company, CustomError> {
        self.require_admin(id, user_id).await?;
        let set = company_changes(request)?;

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to update company", e))?
            .ok_or_else(|| CustomError::NotFoundError("Company not found".to_string()))
    }

    pub async fn list_companies(&self, skip: u64, limit: u64) -> Result<Vec<Company>, CustomError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .skip(skip)
            .limit(limit as i64)
            .await
            .map_err(|e| CustomError::database("Failed to fetch companies", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::database("Failed to collect companies", e))
    }
}
