use std::collections::HashSet;

use futures_util::future::try_join_all;

use crate::client::api::FeedApi;
use crate::client::error::ClientError;
use crate::client::lifetime::LifetimeToken;
use crate::post::post_model::PostView;
use crate::reaction::model::ReactionType;
use crate::utils::model::{OwnerKind, OwnerView};

pub const SUGGESTION_LABEL: &str = "Sugestão";

/// Shown when a reacting owner has no name.
const UNKNOWN_ACTOR: &str = "Alguém";

/// Owners the viewer follows, keyed by kind and id.
#[derive(Debug, Clone, Default)]
pub struct FollowSet {
    owners: HashSet<(OwnerKind, String)>,
}

impl FollowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner: &OwnerView) {
        self.owners.insert((owner.kind, owner.id.clone()));
    }

    pub fn follows(&self, owner: &OwnerView) -> bool {
        self.owners.contains(&(owner.kind, owner.id.clone()))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Line shown above a post in the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    /// Someone the viewer follows reacted to a post by an author the viewer follows.
    Reacted { actor: OwnerView, reaction: ReactionType },
    /// A followed owner reacted to a post by an author the viewer does not follow.
    Suggestion,
}

impl Banner {
    pub fn label(&self) -> String {
        match self {
            Banner::Reacted { actor, reaction } => {
                let name = actor.name.as_deref().unwrap_or(UNKNOWN_ACTOR);
                format!("{} {}", name, reaction_phrase(*reaction))
            }
            Banner::Suggestion => SUGGESTION_LABEL.to_string(),
        }
    }
}

pub fn reaction_phrase(reaction: ReactionType) -> &'static str {
    match reaction {
        ReactionType::Like => "curtiu isso",
        ReactionType::Celebrate => "parabenizou isso",
        ReactionType::Support => "apoiou isso",
        ReactionType::Interesting => "achou isso interessante",
        ReactionType::Funny => "achou isso engraçado",
        ReactionType::Love => "adorou isso",
    }
}

/// Decide the banner for `post` as seen by `viewer`.
///
/// Only the first reaction by an owner the viewer follows counts. It labels the
/// post as a reaction when the viewer also follows the author, and as a
/// suggestion when they do not. The viewer's own posts get nothing.
pub fn classify(post: &PostView, viewer: &OwnerView, follows: &FollowSet) -> Option<Banner> {
    if post.author.same_owner(viewer) {
        return None;
    }

    let reaction = post
        .reactions
        .iter()
        .find(|reaction| !reaction.owner.same_owner(viewer) && follows.follows(&reaction.owner))?;

    if follows.follows(&post.author) {
        Some(Banner::Reacted {
            actor: reaction.owner.clone(),
            reaction: reaction.kind,
        })
    } else {
        Some(Banner::Suggestion)
    }
}

/// Ask the backend which of the post's author and reacting owners the viewer follows.
pub async fn load_follow_set(
    api: &dyn FeedApi,
    post: &PostView,
    viewer: &OwnerView,
    lifetime: &LifetimeToken,
) -> Result<FollowSet, ClientError> {
    let mut candidates: Vec<&OwnerView> = Vec::new();
    for owner in std::iter::once(&post.author).chain(post.reactions.iter().map(|r| &r.owner)) {
        if owner.same_owner(viewer) || candidates.iter().any(|c| c.same_owner(owner)) {
            continue;
        }
        candidates.push(owner);
    }

    let checks = candidates
        .iter()
        .map(|owner| api.check_follow(&owner.id, owner.kind));
    let answers = lifetime.guard(try_join_all(checks)).await?;

    let mut follows = FollowSet::new();
    for (owner, following) in candidates.into_iter().zip(answers) {
        if following {
            follows.insert(owner);
        }
    }
    Ok(follows)
}
