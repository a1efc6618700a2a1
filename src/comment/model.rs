use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::reaction::model::{Reactable, Reaction, ReactionCounts, ReactionType, count_reactions, reaction_of};
use crate::utils::model::{OwnerRef, OwnerView};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub post_id: ObjectId,
    pub author: OwnerRef,
    pub content: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    /// Always a top-level comment; replies never nest deeper.
    #[serde(default)]
    pub parent_comment_id: Option<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reactable for Comment {
    fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
}

impl Comment {
    pub fn to_view(&self, viewer: &OwnerRef, names: &HashMap<OwnerRef, String>) -> CommentView {
        CommentView {
            id: self.id.to_hex(),
            post_id: self.post_id.to_hex(),
            author: self.author.to_view(names.get(&self.author).cloned()),
            content: self.content.clone(),
            parent_comment_id: self.parent_comment_id.map(|id| id.to_hex()),
            reactions_count: count_reactions(&self.reactions),
            current_reaction: reaction_of(&self.reactions, viewer),
            replies: Vec::new(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// A comment as rendered for one viewer; top-level comments carry their replies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub post_id: String,
    pub author: OwnerView,
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    pub reactions_count: ReactionCounts,
    #[serde(default)]
    pub current_reaction: Option<ReactionType>,
    #[serde(default)]
    pub replies: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of a successful comment creation: the stored comment itself.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    pub comment: CommentView,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

/// Group comments (oldest first) into top-level comments with their replies.
///
/// A reply whose parent is itself a reply is attached to the top-level ancestor.
/// Replies whose ancestry is broken (parent deleted) are dropped.
pub fn build_comment_tree(
    comments: &[Comment],
    viewer: &OwnerRef,
    names: &HashMap<OwnerRef, String>,
) -> Vec<CommentView> {
    let parents: HashMap<ObjectId, Option<ObjectId>> = comments
        .iter()
        .map(|c| (c.id, c.parent_comment_id))
        .collect();

    let root_of = |comment: &Comment| -> Option<ObjectId> {
        let mut current = comment.parent_comment_id?;
        for _ in 0..comments.len() {
            match parents.get(&current)? {
                None => return Some(current),
                Some(next) => current = *next,
            }
        }
        None
    };

    let mut roots: Vec<CommentView> = Vec::new();
    let mut index: HashMap<ObjectId, usize> = HashMap::new();
    for comment in comments.iter().filter(|c| c.parent_comment_id.is_none()) {
        index.insert(comment.id, roots.len());
        roots.push(comment.to_view(viewer, names));
    }

    for comment in comments.iter().filter(|c| c.parent_comment_id.is_some()) {
        let Some(root) = root_of(comment) else {
            log::debug!("Dropping orphaned reply {}", comment.id.to_hex());
            continue;
        };
        if let Some(&position) = index.get(&root) {
            let mut view = comment.to_view(viewer, names);
            view.parent_comment_id = Some(root.to_hex());
            roots[position].replies.push(view);
        }
    }

    roots
}
