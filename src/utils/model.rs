use std::fmt;

use mongodb::bson::{Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;
use crate::utils::helpers::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE, parse_object_id};

/// Who owns a post, comment, reaction or follow edge.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    #[default]
    User,
    Company,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "user",
            OwnerKind::Company => "company",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored owner reference: a user or a company page.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: ObjectId,
}

impl OwnerRef {
    pub fn user(id: ObjectId) -> Self {
        Self { kind: OwnerKind::User, id }
    }

    pub fn company(id: ObjectId) -> Self {
        Self { kind: OwnerKind::Company, id }
    }

    /// Filter matching documents whose `field` embeds this owner.
    pub fn filter_on(&self, field: &str) -> Document {
        let mut filter = Document::new();
        filter.insert(format!("{}.kind", field), self.kind.as_str());
        filter.insert(format!("{}.id", field), self.id);
        filter
    }

    pub fn to_view(&self, name: Option<String>) -> OwnerView {
        OwnerView {
            kind: self.kind,
            id: self.id.to_hex(),
            name,
        }
    }
}

/// Owner as exposed over the API, with a resolved display name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub kind: OwnerKind,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl OwnerView {
    pub fn same_owner(&self, other: &OwnerView) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

/// `?type=user|company` on follow routes.
#[derive(Debug, Deserialize)]
pub struct OwnerTypeQuery {
    #[serde(rename = "type", default)]
    pub kind: OwnerKind,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    /// `(skip, limit)` with the page size clamped; pages past `MAX_PAGE` are rejected.
    pub fn bounds(&self) -> Result<(u64, u64), CustomError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(0);
        if page > MAX_PAGE {
            return Err(CustomError::BadRequestError(format!(
                "page must be at most {}",
                MAX_PAGE
            )));
        }
        Ok((page * limit, limit))
    }
}

pub fn parse_owner(kind: OwnerKind, raw_id: &str) -> Result<OwnerRef, CustomError> {
    let id = parse_object_id(raw_id, &format!("{} ID", kind))?;
    Ok(OwnerRef { kind, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_are_clamped() {
        let query = PageQuery { page: Some(2), limit: Some(500) };
        assert_eq!(query.bounds().unwrap(), (200, MAX_PAGE_SIZE));

        let query = PageQuery::default();
        assert_eq!(query.bounds().unwrap(), (0, DEFAULT_PAGE_SIZE));

        let query = PageQuery { page: Some(MAX_PAGE), limit: Some(MAX_PAGE_SIZE) };
        assert_eq!(query.bounds().unwrap(), (MAX_PAGE * MAX_PAGE_SIZE, MAX_PAGE_SIZE));
    }

    #[test]
    fn huge_pages_are_rejected() {
        let query = PageQuery { page: Some(u64::MAX / 50), limit: Some(100) };
        assert!(matches!(query.bounds(), Err(CustomError::BadRequestError(_))));

        let query = PageQuery { page: Some(MAX_PAGE + 1), limit: None };
        assert!(query.bounds().is_err());
    }

    #[test]
    fn owner_kind_parses_lowercase() {
        let query: OwnerTypeQuery = serde_json::from_str(r#"{"type":"company"}"#).unwrap();
        assert_eq!(query.kind, OwnerKind::Company);
        let query: OwnerTypeQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.kind, OwnerKind::User);
    }

    #[test]
    fn owner_filter_targets_embedded_fields() {
        let id = ObjectId::new();
        let filter = OwnerRef::company(id).filter_on("author");
        assert_eq!(filter.get_str("author.kind").unwrap(), "company");
        assert_eq!(filter.get_object_id("author.id").unwrap(), id);
    }
}
