use chrono::Utc;
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::user::model::{ContactInfo, Education, Experience, UpdateProfileRequest, User};
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::validation::{optional_text, require_text, validate_email, validate_phone, validate_url};

pub struct UserService {
    collection: Collection<User>,
}

/// Validate a profile update and turn it into a `$set` document.
pub fn profile_changes(update: &UpdateProfileRequest) -> Result<Document, CustomError> {
    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };

    if let Some(name) = &update.name {
        set.insert("name", require_text("Name", name, 120)?);
    }
    if let Some(headline) = &update.headline {
        set.insert("headline", to_bson_field(&optional_text("Headline", Some(headline), 220)?)?);
    }
    if let Some(about) = &update.about {
        set.insert("about", to_bson_field(&optional_text("About", Some(about), 2600)?)?);
    }
    if let Some(avatar_url) = &update.avatar_url {
        let avatar_url = optional_text("Avatar URL", Some(avatar_url), 2048)?;
        if let Some(url) = &avatar_url {
            validate_url(url)?;
        }
        set.insert("avatar_url", to_bson_field(&avatar_url)?);
    }
    if let Some(experience) = &update.experience {
        experience.iter().try_for_each(validate_experience)?;
        set.insert("experience", to_bson_field(experience)?);
    }
    if let Some(education) = &update.education {
        education.iter().try_for_each(validate_education)?;
        set.insert("education", to_bson_field(education)?);
    }
    if let Some(contact_info) = &update.contact_info {
        validate_contact(contact_info)?;
        set.insert("contact_info", to_bson_field(contact_info)?);
    }

    Ok(set)
}

fn to_bson_field<T: serde::Serialize>(value: &T) -> Result<mongodb::bson::Bson, CustomError> {
    to_bson(value).map_err(|e| CustomError::InternalServerError(e.to_string()))
}

fn validate_experience(entry: &Experience) -> Result<(), CustomError> {
    require_text("Experience title", &entry.title, 120)?;
    require_text("Experience company", &entry.company, 120)?;
    require_text("Experience start date", &entry.start_date, 32)?;
    if let Some(end) = &entry.end_date {
        if end.as_str() < entry.start_date.as_str() {
            return Err(CustomError::ValidationError(format!(
                "Experience '{}' ends before it starts",
                entry.title
            )));
        }
    }
    Ok(())
}

fn validate_education(entry: &Education) -> Result<(), CustomError> {
    require_text("School", &entry.school, 160)?;
    if let (Some(start), Some(end)) = (entry.start_year, entry.end_year) {
        if end < start {
            return Err(CustomError::ValidationError(format!(
                "Education at '{}' ends before it starts",
                entry.school
            )));
        }
    }
    Ok(())
}

fn validate_contact(contact: &ContactInfo) -> Result<(), CustomError> {
    if let Some(email) = &contact.email {
        validate_email(email)?;
    }
    if let Some(phone) = &contact.phone {
        validate_phone(phone)?;
    }
    if let Some(website) = &contact.website {
        validate_url(website)?;
    }
    Ok(())
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(&database_name()).collection::<User>("users");
        UserService { collection }
    }

    pub async fn get_profile(&self, user_id: &ObjectId) -> Result<User, CustomError> {
        self.collection
            .find_one(doc! { "_id": user_id })
            .await
            .map_err(|e| CustomError::database("Failed to fetch profile", e))?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))
    }

    /// Apply a profile update, creating the profile on first write
    pub async fn update_profile(
        &self,
        user_id: &ObjectId,
        update: &UpdateProfileRequest,
    ) -> Result<User, CustomError> {
        let set = profile_changes(update)?;

        self.collection
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! {
                    "$set": set,
                    "$setOnInsert": { "created_at": Utc::now().to_rfc3339() }
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to update profile", e))?
            .ok_or_else(|| CustomError::InternalServerError("Profile missing after update".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experience(start: &str, end: Option<&str>) -> Experience {
        Experience {
            title: "Engenheira de Dados".into(),
            company: "Acme".into(),
            location: None,
            start_date: start.into(),
            end_date: end.map(Into::into),
            description: None,
        }
    }

    #[test]
    fn only_present_fields_are_set() {
        let update = UpdateProfileRequest {
            headline: Some("Backend @ Acme".into()),
            ..Default::default()
        };
        let set = profile_changes(&update).unwrap();
        assert_eq!(set.get_str("headline").unwrap(), "Backend @ Acme");
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("name"));
        assert!(!set.contains_key("experience"));
    }

    #[test]
    fn blank_headline_clears_it() {
        let update = UpdateProfileRequest {
            headline: Some("   ".into()),
            ..Default::default()
        };
        let set = profile_changes(&update).unwrap();
        assert!(set.get("headline").unwrap().as_null().is_some());
    }

    #[test]
    fn invalid_contact_is_rejected() {
        let update = UpdateProfileRequest {
            contact_info: Some(ContactInfo {
                email: Some("nope".into()),
                phone: None,
                website: None,
            }),
            ..Default::default()
        };
        assert!(matches!(profile_changes(&update), Err(CustomError::ValidationError(_))));
    }

    #[test]
    fn experience_dates_are_ordered() {
        let update = UpdateProfileRequest {
            experience: Some(vec![experience("2022-01", Some("2021-06"))]),
            ..Default::default()
        };
        assert!(profile_changes(&update).is_err());

        let update = UpdateProfileRequest {
            experience: Some(vec![experience("2021-01", Some("2023-06")), experience("2023-07", None)]),
            ..Default::default()
        };
        let set = profile_changes(&update).unwrap();
        assert_eq!(set.get_array("experience").unwrap().len(), 2);
    }

    #[test]
    fn education_years_are_ordered() {
        let update = UpdateProfileRequest {
            education: Some(vec![Education {
                school: "USP".into(),
                degree: None,
                field_of_study: None,
                start_year: Some(2020),
                end_year: Some(2018),
            }]),
            ..Default::default()
        };
        assert!(profile_changes(&update).is_err());
    }
}
