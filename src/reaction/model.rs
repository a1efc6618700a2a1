use std::collections::BTreeMap;
use std::fmt;

use mongodb::bson::{Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::model::{OwnerKind, OwnerRef, OwnerView};

/// The six mutually exclusive reaction kinds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Celebrate,
    Support,
    Interesting,
    Funny,
    Love,
}

impl ReactionType {
    pub const ALL: [ReactionType; 6] = [
        ReactionType::Like,
        ReactionType::Celebrate,
        ReactionType::Support,
        ReactionType::Interesting,
        ReactionType::Funny,
        ReactionType::Love,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Celebrate => "celebrate",
            ReactionType::Support => "support",
            ReactionType::Interesting => "interesting",
            ReactionType::Funny => "funny",
            ReactionType::Love => "love",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embedded reaction entry. Exactly one of `user` / `company` is set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<ObjectId>,
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

impl Reaction {
    pub fn new(owner: OwnerRef, kind: ReactionType) -> Self {
        match owner.kind {
            OwnerKind::User => Reaction { user: Some(owner.id), company: None, kind },
            OwnerKind::Company => Reaction { user: None, company: Some(owner.id), kind },
        }
    }

    /// `None` for malformed entries carrying zero or two owners.
    pub fn owner(&self) -> Option<OwnerRef> {
        match (self.user, self.company) {
            (Some(id), None) => Some(OwnerRef::user(id)),
            (None, Some(id)) => Some(OwnerRef::company(id)),
            _ => None,
        }
    }

    /// Sub-document matching this owner's entry inside a `reactions` array.
    pub fn owner_match(owner: &OwnerRef) -> Document {
        let mut matcher = Document::new();
        matcher.insert(owner.kind.as_str(), owner.id);
        matcher
    }
}

/// Per-type totals; always carries all six keys.
pub type ReactionCounts = BTreeMap<ReactionType, u64>;

pub fn empty_counts() -> ReactionCounts {
    ReactionType::ALL.iter().map(|kind| (*kind, 0)).collect()
}

pub fn count_reactions(reactions: &[Reaction]) -> ReactionCounts {
    let mut counts = empty_counts();
    for reaction in reactions.iter().filter(|r| r.owner().is_some()) {
        *counts.entry(reaction.kind).or_insert(0) += 1;
    }
    counts
}

pub fn reaction_of(reactions: &[Reaction], owner: &OwnerRef) -> Option<ReactionType> {
    reactions
        .iter()
        .find(|r| r.owner().as_ref() == Some(owner))
        .map(|r| r.kind)
}

/// Embedded reactions on a stored document.
pub trait Reactable {
    fn reactions(&self) -> &[Reaction];
}

/// Authoritative reaction state for one viewer, as returned by the reaction endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSnapshot {
    pub current_reaction: Option<ReactionType>,
    pub reactions_count: ReactionCounts,
}

impl ReactionSnapshot {
    pub fn for_owner(reactions: &[Reaction], owner: &OwnerRef) -> Self {
        Self {
            current_reaction: reaction_of(reactions, owner),
            reactions_count: count_reactions(reactions),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    #[serde(default)]
    pub reaction_type: Option<ReactionType>,
}

/// One reaction as shown on a post, in array order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReactionView {
    pub owner: OwnerView,
    #[serde(rename = "type")]
    pub kind: ReactionType,
}
