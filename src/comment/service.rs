use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::comment::model::{Comment, CommentView, build_comment_tree};
use crate::reaction::directory::OwnerDirectory;
use crate::utils::error::CustomError;
use crate::utils::helpers::database_name;
use crate::utils::model::OwnerRef;

pub struct CommentService {
    collection: Collection<Comment>,
    posts: Collection<Document>,
    directory: OwnerDirectory,
}

impl CommentService {
    pub fn new(client: &Client) -> Self {
        let db = client.database(&database_name());
        CommentService {
            collection: db.collection::<Comment>("comments"),
            posts: db.collection::<Document>("posts"),
            directory: OwnerDirectory::new(client),
        }
    }

    /// Add a comment or reply and return the stored document.
    ///
    /// A reply aimed at another reply is re-parented to that reply's top-level comment.
    pub async fn add_comment(
        &self,
        post_id: ObjectId,
        author: OwnerRef,
        parent_comment_id: Option<ObjectId>,
        content: String,
    ) -> Result<Comment, CustomError> {
        let post_exists = self
            .posts
            .count_documents(doc! { "_id": post_id })
            .await
            .map_err(|e| CustomError::database("Failed to check post", e))?
            > 0;
        if !post_exists {
            return Err(CustomError::NotFoundError("Post not found".to_string()));
        }

        let parent_comment_id = match parent_comment_id {
            None => None,
            Some(parent_id) => {
                let parent = self
                    .get_comment_by_id(&parent_id)
                    .await?
                    .ok_or_else(|| CustomError::NotFoundError("Parent comment not found".to_string()))?;
                if parent.post_id != post_id {
                    return Err(CustomError::BadRequestError(
                        "Parent comment belongs to another post".to_string(),
                    ));
                }
                Some(parent.parent_comment_id.unwrap_or(parent.id))
            }
        };

        let now = Utc::now();
        let comment = Comment {
            id: ObjectId::new(),
            post_id,
            author,
            content,
            reactions: Vec::new(),
            parent_comment_id,
            created_at: now,
            updated_at: now,
        };

        self.collection
            .insert_one(&comment)
            .await
            .map_err(|e| CustomError::database("Failed to add comment", e))?;

        self.adjust_post_counter(&post_id, 1).await?;

        Ok(comment)
    }

    /// All comments of a post, oldest first
    pub async fn get_comments_for_post(&self, post_id: &ObjectId) -> Result<Vec<Comment>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "post_id": post_id })
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|e| CustomError::database("Failed to fetch comments", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::database("Failed to collect comments", e))
    }

    /// Top-level comments with nested replies, rendered for `viewer`
    pub async fn comment_tree(&self, post_id: &ObjectId, viewer: &OwnerRef) -> Result<Vec<CommentView>, CustomError> {
        let comments = self.get_comments_for_post(post_id).await?;
        let names = self
            .directory
            .names(comments.iter().map(|c| c.author))
            .await?;
        Ok(build_comment_tree(&comments, viewer, &names))
    }

    pub async fn to_view(&self, comment: &Comment, viewer: &OwnerRef) -> Result<CommentView, CustomError> {
        let names = self.directory.names([comment.author]).await?;
        Ok(comment.to_view(viewer, &names))
    }

    pub async fn get_comment_by_id(&self, comment_id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        self.collection
            .find_one(doc! { "_id": comment_id })
            .await
            .map_err(|e| CustomError::database("Failed to fetch comment", e))
    }

    /// Update a comment (only author can update)
    pub async fn update_comment(
        &self,
        comment_id: &ObjectId,
        author: &OwnerRef,
        content: String,
    ) -> Result<Comment, CustomError> {
        let mut filter = author.filter_on("author");
        filter.insert("_id", *comment_id);

        self.collection
            .find_one_and_update(
                filter,
                doc! {
                    "$set": {
                        "content": content,
                        "updated_at": Utc::now().to_rfc3339()
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::database("Failed to update comment", e))?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found or not authorized".to_string()))
    }

    /// Delete a comment and its replies (only author can delete); returns how many were removed
    pub async fn delete_comment(&self, comment_id: &ObjectId, author: &OwnerRef) -> Result<u64, CustomError> {
        let mut filter = author.filter_on("author");
        filter.insert("_id", *comment_id);

        let comment = self
            .collection
            .find_one_and_delete(filter)
            .await
            .map_err(|e| CustomError::database("Failed to delete comment", e))?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found or not authorized".to_string()))?;

        let replies = self
            .collection
            .delete_many(doc! { "parent_comment_id": comment.id })
            .await
            .map_err(|e| CustomError::database("Failed to delete replies", e))?;

        let removed = 1 + replies.deleted_count;
        self.adjust_post_counter(&comment.post_id, -(removed as i64)).await?;

        Ok(removed)
    }

    pub async fn get_comment_count(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        self.collection
            .count_documents(doc! { "post_id": post_id })
            .await
            .map_err(|e| CustomError::database("Failed to count comments", e))
    }

    async fn adjust_post_counter(&self, post_id: &ObjectId, delta: i64) -> Result<(), CustomError> {
        self.posts
            .update_one(doc! { "_id": post_id }, doc! { "$inc": { "comments_count": delta } })
            .await
            .map_err(|e| CustomError::database("Failed to update comment count", e))?;
        Ok(())
    }
}
