use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::follow::model::Follow;
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::model::{OwnerKind, OwnerRef};

pub struct FollowService {
    collection: Collection<Follow>,
    users: Collection<Document>,
    companies: Collection<Document>,
}

fn edge_filter(follower: &OwnerRef, following: &OwnerRef) -> Document {
    let mut filter = follower.filter_on("follower");
    filter.extend(following.filter_on("following"));
    filter
}

impl FollowService {
    pub fn new(client: &Client) -> Self {
        let db = client.database(&database_name());
        FollowService {
            collection: db.collection::<Follow>("follows"),
            users: db.collection::<Document>("users"),
            companies: db.collection::<Document>("companies"),
        }
    }

    async fn owner_exists(&self, owner: &OwnerRef) -> Result<bool, CustomError> {
        let collection = match owner.kind {
            OwnerKind::User => &self.users,
            OwnerKind::Company => &self.companies,
        };
        let count = collection
            .count_documents(doc! { "_id": owner.id })
            .await
            .map_err(|e| CustomError::database("Failed to look up follow target", e))?;
        Ok(count > 0)
    }

    pub async fn follow(&self, follower: OwnerRef, following: OwnerRef) -> Result<(), CustomError> {
        if follower == following {
            return Err(CustomError::BadRequestError("You cannot follow yourself".to_string()));
        }
        if !self.owner_exists(&following).await? {
            return Err(CustomError::NotFoundError(format!("{} not found", following.kind)));
        }
        if self.is_following(&follower, &following).await? {
            return Err(CustomError::ConflictError("Already following".to_string()));
        }

        let edge = Follow {
            id: ObjectId::new(),
            follower,
            following,
            created_at: Utc::now(),
        };
        self.collection
            .insert_one(edge)
            .await
            .map_err(|e| CustomError::database("Failed to follow", e))?;

        Ok(())
    }

    pub async fn unfollow(&self, follower: &OwnerRef, following: &OwnerRef) -> Result<(), CustomError> {
        let result = self
            .collection
            .delete_one(edge_filter(follower, following))
            .await
            .map_err(|e| CustomError::database("Failed to unfollow", e))?;

        if result.deleted_count == 0 {
            return Err(CustomError::NotFoundError("Not following".to_string()));
        }
        Ok(())
    }

    pub async fn is_following(&self, follower: &OwnerRef, following: &OwnerRef) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(edge_filter(follower, following))
            .await
            .map_err(|e| CustomError::database("Failed to check follow status", e))?;
        Ok(count > 0)
    }

    /// Everyone `follower` follows, most recent first
    pub async fn following_of(&self, follower: &OwnerRef) -> Result<Vec<OwnerRef>, CustomError> {
        let cursor = self
            .collection
            .find(follower.filter_on("follower"))
            .sort(doc! { "_id": -1 })
            .await
            .map_err(|e| CustomError::database("Failed to fetch follows", e))?;

        let edges: Vec<Follow> = cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::database("Failed to collect follows", e))?;

        Ok(edges.into_iter().map(|edge| edge.following).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_filter_covers_both_ends() {
        let follower = OwnerRef::user(ObjectId::new());
        let following = OwnerRef::company(ObjectId::new());
        let filter = edge_filter(&follower, &following);
        assert_eq!(filter.len(), 4);
        assert_eq!(filter.get_str("following.kind").unwrap(), "company");
        assert_eq!(filter.get_object_id("follower.id").unwrap(), follower.id);
    }
}
