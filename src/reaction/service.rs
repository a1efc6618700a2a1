use mongodb::bson::{Bson, Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use serde::de::DeserializeOwned;

use crate::comment::model::Comment;
use crate::post::post_model::Post;
use crate::reaction::model::{Reactable, Reaction, ReactionSnapshot, ReactionType};
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::model::OwnerRef;

pub struct ReactionService {
    posts: Collection<Post>,
    comments: Collection<Comment>,
}

impl ReactionService {
    pub fn new(client: &Client) -> Self {
        let db = client.database(&database_name());
        ReactionService {
            posts: db.collection::<Post>("posts"),
            comments: db.collection::<Comment>("comments"),
        }
    }

    pub async fn react_to_post(
        &self,
        post_id: &ObjectId,
        owner: OwnerRef,
        choice: Option<ReactionType>,
    ) -> Result<ReactionSnapshot, CustomError> {
        set_reaction(&self.posts, post_id, owner, choice, "Post").await
    }

    pub async fn react_to_comment(
        &self,
        comment_id: &ObjectId,
        owner: OwnerRef,
        choice: Option<ReactionType>,
    ) -> Result<ReactionSnapshot, CustomError> {
        set_reaction(&self.comments, comment_id, owner, choice, "Comment").await
    }
}

/// Attempts before a contended replacement gives up.
const REPLACE_ATTEMPTS: usize = 5;

/// Matches the document only while `owner` has no entry in its `reactions`.
fn vacant_filter(id: &ObjectId, owner: &OwnerRef) -> Document {
    doc! {
        "_id": id,
        "reactions": { "$not": { "$elemMatch": Reaction::owner_match(owner) } },
    }
}

/// Pull the owner's entry, then push `entry` only if no concurrent request pushed one first.
async fn replace_reaction<T>(
    collection: &Collection<T>,
    id: &ObjectId,
    owner: &OwnerRef,
    entry: Bson,
    what: &str,
) -> Result<Option<T>, CustomError>
where
    T: DeserializeOwned + Send + Sync,
{
    let pull = doc! { "$pull": { "reactions": Reaction::owner_match(owner) } };

    for attempt in 1..=REPLACE_ATTEMPTS {
        let pulled = collection
            .update_one(doc! { "_id": id }, pull.clone())
            .await
            .map_err(|e| CustomError::database("Failed to replace reaction", e))?;
        if pulled.matched_count == 0 {
            return Err(CustomError::NotFoundError(format!("{} not found", what)));
        }

        let pushed = collection
            .find_one_and_update(vacant_filter(id, owner), doc! { "$push": { "reactions": entry.clone() } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to store reaction", e))?;
        if pushed.is_some() {
            return Ok(pushed);
        }
        log::debug!("Reaction on {} {} raced another write, attempt {}", what, id.to_hex(), attempt);
    }

    Err(CustomError::ConflictError(
        "Reaction is being changed concurrently, try again".to_string(),
    ))
}

/// Replace `owner`'s reaction on a document, or remove it when `choice` is `None`.
///
/// Uses `$pull` then a guarded `$push` so entries of other owners are never
/// rewritten and one owner never ends up with two entries.
async fn set_reaction<T>(
    collection: &Collection<T>,
    id: &ObjectId,
    owner: OwnerRef,
    choice: Option<ReactionType>,
    what: &str,
) -> Result<ReactionSnapshot, CustomError>
where
    T: Reactable + DeserializeOwned + Send + Sync,
{
    let filter = doc! { "_id": id };
    let pull = doc! { "$pull": { "reactions": Reaction::owner_match(&owner) } };

    let updated = match choice {
        None => collection
            .find_one_and_update(filter, pull)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to remove reaction", e))?,
        Some(kind) => {
            let entry = to_bson(&Reaction::new(owner, kind))
                .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            replace_reaction(collection, id, &owner, entry, what).await?
        }
    };

    let document = updated.ok_or_else(|| CustomError::NotFoundError(format!("{} not found", what)))?;
    log::debug!(
        "{} {} reaction by {} {} set to {:?}",
        what,
        id.to_hex(),
        owner.kind,
        owner.id.to_hex(),
        choice
    );

    Ok(ReactionSnapshot::for_owner(document.reactions(), &owner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_is_guarded_against_an_existing_entry() {
        let id = ObjectId::new();
        let owner = OwnerRef::company(ObjectId::new());

        let filter = vacant_filter(&id, &owner);
        assert_eq!(filter.get_object_id("_id").unwrap(), id);

        let matcher = filter
            .get_document("reactions")
            .and_then(|r| r.get_document("$not"))
            .and_then(|n| n.get_document("$elemMatch"))
            .unwrap();
        assert_eq!(matcher.get_object_id("company").unwrap(), owner.id);
        assert!(matcher.get("user").is_none());
    }
}
