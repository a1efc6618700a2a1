use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::reaction::model::{
    Reactable, Reaction, ReactionCounts, ReactionType, ReactionView, count_reactions, reaction_of,
};
use crate::utils::model::{OwnerRef, OwnerView};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author: OwnerRef,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub shares_count: i64,
    #[serde(default)]
    pub is_highlighted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reactable for Post {
    fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
}

impl Post {
    /// Owners whose names a view of this post needs.
    pub fn owners(&self) -> impl Iterator<Item = OwnerRef> + '_ {
        std::iter::once(self.author).chain(self.reactions.iter().filter_map(Reaction::owner))
    }

    pub fn to_view(&self, viewer: &OwnerRef, names: &HashMap<OwnerRef, String>) -> PostView {
        let reactions = self
            .reactions
            .iter()
            .filter_map(|reaction| {
                let owner = reaction.owner()?;
                Some(ReactionView {
                    owner: owner.to_view(names.get(&owner).cloned()),
                    kind: reaction.kind,
                })
            })
            .collect();

        PostView {
            id: self.id.to_hex(),
            author: self.author.to_view(names.get(&self.author).cloned()),
            content: self.content.clone(),
            media_url: self.media_url.clone(),
            reactions,
            reactions_count: count_reactions(&self.reactions),
            current_reaction: reaction_of(&self.reactions, viewer),
            comments_count: self.comments_count.max(0) as u64,
            shares_count: self.shares_count.max(0) as u64,
            is_highlighted: self.is_highlighted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub is_highlighted: Option<bool>,
}

/// Full post snapshot for one viewer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub author: OwnerView,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub reactions: Vec<ReactionView>,
    pub reactions_count: ReactionCounts,
    #[serde(default)]
    pub current_reaction: Option<ReactionType>,
    pub comments_count: u64,
    pub shares_count: u64,
    pub is_highlighted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::model::OwnerKind;

    fn post_with(reactions: Vec<Reaction>) -> Post {
        Post {
            id: ObjectId::new(),
            author: OwnerRef::company(ObjectId::new()),
            content: Some("Estamos contratando".into()),
            media_url: None,
            reactions,
            comments_count: 3,
            shares_count: -1,
            is_highlighted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_resolves_names_and_viewer_reaction() {
        let ana = OwnerRef::user(ObjectId::new());
        let bia = OwnerRef::user(ObjectId::new());
        let post = post_with(vec![
            Reaction::new(ana, ReactionType::Love),
            Reaction::new(bia, ReactionType::Like),
        ]);

        let mut names = HashMap::new();
        names.insert(ana, "Ana".to_string());
        names.insert(post.author, "Acme".to_string());

        let view = post.to_view(&bia, &names);
        assert_eq!(view.current_reaction, Some(ReactionType::Like));
        assert_eq!(view.author.name.as_deref(), Some("Acme"));
        assert_eq!(view.author.kind, OwnerKind::Company);
        assert_eq!(view.reactions[0].owner.name.as_deref(), Some("Ana"));
        assert_eq!(view.reactions[1].owner.name, None);
        assert_eq!(view.reactions_count[&ReactionType::Love], 1);
        assert_eq!(view.shares_count, 0);
        assert_eq!(post.owners().count(), 3);
    }

    #[test]
    fn view_serializes_camel_case() {
        let post = post_with(Vec::new());
        let value = serde_json::to_value(post.to_view(&post.author, &HashMap::new())).unwrap();
        assert_eq!(value["commentsCount"], 3);
        assert!(value["currentReaction"].is_null());
        assert!(value.get("isHighlighted").is_some());
    }
}
