use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::post::post_model::{Post, PostView};
use crate::reaction::directory::OwnerDirectory;
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::model::OwnerRef;

pub struct PostService {
    collection: Collection<Post>,
    comments: Collection<Document>,
    directory: OwnerDirectory,
}

impl PostService {
    pub fn new(client: &Client) -> Self {
        let db = client.database(&database_name());
        PostService {
            collection: db.collection::<Post>("posts"),
            comments: db.collection::<Document>("comments"),
            directory: OwnerDirectory::new(client),
        }
    }

    pub async fn create_post(&self, post: Post) -> Result<Post, CustomError> {
        self.collection
            .insert_one(&post)
            .await
            .map_err(|e| CustomError::database("Failed to create post", e))?;

        Ok(post)
    }

    pub async fn get_post(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to fetch post", e))
    }

    pub async fn require_post(&self, id: &ObjectId) -> Result<Post, CustomError> {
        self.get_post(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))
    }

    /// Delete a post and its comments; only the author may do this.
    pub async fn delete_post(&self, id: &ObjectId, author: &OwnerRef) -> Result<(), CustomError> {
        let mut filter = author.filter_on("author");
        filter.insert("_id", *id);

        let result = self
            .collection
            .delete_one(filter)
            .await
            .map_err(|e| CustomError::database("Failed to delete post", e))?;

        if result.deleted_count == 0 {
            return Err(CustomError::NotFoundError(
                "Post not found or not authorized".into(),
            ));
        }

        let removed = self
            .comments
            .delete_many(doc! { "post_id": id })
            .await
            .map_err(|e| CustomError::database("Failed to delete post comments", e))?;
        log::info!(
            "Deleted post {} with {} comments",
            id.to_hex(),
            removed.deleted_count
        );

        Ok(())
    }

    pub async fn update_post(
        &self,
        id: &ObjectId,
        author: &OwnerRef,
        content: Option<String>,
        media_url: Option<String>,
        is_highlighted: Option<bool>,
    ) -> Result<Post, CustomError> {
        let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
        if let Some(c) = content {
            set.insert("content", c);
        }
        if let Some(m) = media_url {
            set.insert("media_url", m);
        }
        if let Some(h) = is_highlighted {
            set.insert("is_highlighted", h);
        }

        let mut filter = author.filter_on("author");
        filter.insert("_id", *id);

        self.collection
            .find_one_and_update(filter, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to update post", e))?
            .ok_or_else(|| CustomError::NotFoundError("Post not found or not authorized".into()))
    }

    pub async fn share_post(&self, id: &ObjectId) -> Result<Post, CustomError> {
        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "shares_count": 1 } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to share post", e))?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))
    }

    /// Newest posts first.
    pub async fn recent_posts(&self, limit: u64) -> Result<Vec<Post>, CustomError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .limit(limit as i64)
            .await
            .map_err(|e| CustomError::database("Failed to fetch posts", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::database("Failed to collect posts", e))
    }

    pub async fn to_views(&self, posts: &[Post], viewer: &OwnerRef) -> Result<Vec<PostView>, CustomError> {
        let names = self
            .directory
            .names(posts.iter().flat_map(|post| post.owners()))
            .await?;
        Ok(posts.iter().map(|post| post.to_view(viewer, &names)).collect())
    }

    pub async fn to_view(&self, post: &Post, viewer: &OwnerRef) -> Result<PostView, CustomError> {
        let names = self.directory.names(post.owners()).await?;
        Ok(post.to_view(viewer, &names))
    }
}
