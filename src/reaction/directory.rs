use std::collections::{HashMap, HashSet};

use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::model::{OwnerKind, OwnerRef};

/// Resolves display names for users and company pages in batches.
pub struct OwnerDirectory {
    users: Collection<Document>,
    companies: Collection<Document>,
}

impl OwnerDirectory {
    pub fn new(client: &Client) -> Self {
        let db = client.database(&database_name());
        OwnerDirectory {
            users: db.collection::<Document>("users"),
            companies: db.collection::<Document>("companies"),
        }
    }

    pub async fn names<I>(&self, owners: I) -> Result<HashMap<OwnerRef, String>, CustomError>
    where
        I: IntoIterator<Item = OwnerRef>,
    {
        let mut user_ids = HashSet::new();
        let mut company_ids = HashSet::new();
        for owner in owners {
            match owner.kind {
                OwnerKind::User => user_ids.insert(owner.id),
                OwnerKind::Company => company_ids.insert(owner.id),
            };
        }

        let mut names = HashMap::new();
        for (id, name) in lookup(&self.users, user_ids).await? {
            names.insert(OwnerRef::user(id), name);
        }
        for (id, name) in lookup(&self.companies, company_ids).await? {
            names.insert(OwnerRef::company(id), name);
        }
        Ok(names)
    }
}

async fn lookup(
    collection: &Collection<Document>,
    ids: HashSet<ObjectId>,
) -> Result<Vec<(ObjectId, String)>, CustomError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<ObjectId> = ids.into_iter().collect();
    let cursor = collection
        .find(doc! { "_id": { "$in": ids } })
        .projection(doc! { "name": 1 })
        .await
        .map_err(|e| CustomError::database("Failed to resolve owner names", e))?;

    let docs: Vec<Document> = cursor
        .try_collect()
        .await
        .map_err(|e| CustomError::database("Failed to collect owner names", e))?;

    Ok(docs
        .into_iter()
        .filter_map(|d| {
            let id = d.get_object_id("_id").ok()?;
            let name = d.get_str("name").ok()?.to_string();
            Some((id, name))
        })
        .collect())
}
