use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::model::JobView;
use crate::post::post_model::PostView;

/// One timeline entry, tagged by `kind`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedItem {
    Post(PostView),
    Job(JobView),
}

impl FeedItem {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            FeedItem::Post(post) => post.created_at,
            FeedItem::Job(job) => job.created_at,
        }
    }

    pub fn as_post(&self) -> Option<&PostView> {
        match self {
            FeedItem::Post(post) => Some(post),
            FeedItem::Job(_) => None,
        }
    }
}
