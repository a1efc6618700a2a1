use std::collections::HashSet;

use crate::client::api::FeedApi;
use crate::client::error::ClientError;
use crate::client::lifetime::LifetimeToken;
use crate::comment::model::{CommentView, CreateCommentRequest};
use crate::utils::helpers::REPLY_PREVIEW_LIMIT;

/// One top-level comment as it should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedComment<'a> {
    pub comment: &'a CommentView,
    /// False when the comment has no replies at all.
    pub show_toggle: bool,
    pub replies_visible: bool,
    /// Replies to draw; empty while collapsed.
    pub replies: &'a [CommentView],
    /// Count behind the "see N more" link.
    pub hidden_replies: usize,
}

/// Comment thread of a single post.
///
/// The full list is fetched once when the thread is first expanded; the reply
/// cap and "see more" only slice the local copy.
#[derive(Debug)]
pub struct CommentThread {
    post_id: String,
    lifetime: LifetimeToken,
    comments: Vec<CommentView>,
    loaded: bool,
    expanded: bool,
    /// Comments whose replies are shown.
    forced_visible: HashSet<String>,
    /// Comments whose replies are shown past the preview cap.
    show_all: HashSet<String>,
    /// Comments we created that a read has not returned yet.
    unconfirmed: Vec<CommentView>,
}

impl CommentThread {
    pub fn new(post_id: impl Into<String>, lifetime: LifetimeToken) -> Self {
        Self {
            post_id: post_id.into(),
            lifetime,
            comments: Vec::new(),
            loaded: false,
            expanded: false,
            forced_visible: HashSet::new(),
            show_all: HashSet::new(),
            unconfirmed: Vec::new(),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn comments(&self) -> &[CommentView] {
        &self.comments
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Expanding a thread that was never loaded fetches it.
    pub async fn set_expanded(&mut self, api: &dyn FeedApi, expanded: bool) -> Result<(), ClientError> {
        self.expanded = expanded;
        if expanded && !self.loaded {
            self.refresh(api).await?;
        }
        Ok(())
    }

    pub async fn refresh(&mut self, api: &dyn FeedApi) -> Result<(), ClientError> {
        match self.lifetime.guard(api.fetch_comments(&self.post_id)).await {
            Ok(comments) => {
                self.apply_fetch(comments);
                Ok(())
            }
            Err(e) => {
                e.log("Loading comments");
                Err(e)
            }
        }
    }

    /// Replace the local tree with a fresh read and drop state for comments that are gone.
    pub fn apply_fetch(&mut self, comments: Vec<CommentView>) {
        self.comments = comments;
        self.loaded = true;

        let mut pending = std::mem::take(&mut self.unconfirmed);
        pending.retain(|created| !self.contains(&created.id));
        for created in pending {
            if self.merge(created.clone()) {
                self.unconfirmed.push(created);
            }
        }

        let present: HashSet<String> = self.comments.iter().map(|c| c.id.clone()).collect();
        self.forced_visible.retain(|id| present.contains(id));
        self.show_all.retain(|id| present.contains(id));
    }

    fn contains(&self, id: &str) -> bool {
        self.comments
            .iter()
            .any(|c| c.id == id || c.replies.iter().any(|r| r.id == id))
    }

    /// Insert a created comment; false when its parent no longer exists.
    fn merge(&mut self, created: CommentView) -> bool {
        if self.contains(&created.id) {
            return true;
        }
        match created.parent_comment_id.clone() {
            None => {
                self.comments.push(created);
                true
            }
            Some(parent_id) => match self.comments.iter_mut().find(|c| c.id == parent_id) {
                Some(parent) => {
                    parent.replies.push(created);
                    true
                }
                None => false,
            },
        }
    }

    pub fn replies_visible(&self, comment_id: &str) -> bool {
        self.forced_visible.contains(comment_id)
    }

    pub fn force_show_replies(&mut self, comment_id: &str) {
        self.forced_visible.insert(comment_id.to_string());
    }

    /// Flip reply visibility; comments without replies have no toggle.
    pub fn toggle_replies(&mut self, comment_id: &str) -> bool {
        let has_replies = self
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .is_some_and(|c| !c.replies.is_empty());
        if !has_replies {
            return false;
        }

        if !self.forced_visible.remove(comment_id) {
            self.forced_visible.insert(comment_id.to_string());
        }
        self.replies_visible(comment_id)
    }

    /// "See N more": reveal every reply of the comment.
    pub fn show_more_replies(&mut self, comment_id: &str) {
        self.forced_visible.insert(comment_id.to_string());
        self.show_all.insert(comment_id.to_string());
    }

    pub fn render(&self) -> Vec<RenderedComment<'_>> {
        self.comments
            .iter()
            .map(|comment| {
                let total = comment.replies.len();
                let visible = total > 0 && self.forced_visible.contains(&comment.id);
                let shown = if !visible {
                    0
                } else if self.show_all.contains(&comment.id) {
                    total
                } else {
                    total.min(REPLY_PREVIEW_LIMIT)
                };

                RenderedComment {
                    comment,
                    show_toggle: total > 0,
                    replies_visible: visible,
                    replies: &comment.replies[..shown],
                    hidden_replies: if visible { total - shown } else { 0 },
                }
            })
            .collect()
    }

    pub async fn submit_comment(
        &mut self,
        api: &dyn FeedApi,
        content: &str,
    ) -> Result<CommentView, ClientError> {
        self.submit(api, content, None).await
    }

    /// Post a reply to `parent_id`; the parent's replies stay open afterwards.
    pub async fn submit_reply(
        &mut self,
        api: &dyn FeedApi,
        parent_id: &str,
        content: &str,
    ) -> Result<CommentView, ClientError> {
        self.submit(api, content, Some(parent_id.to_string())).await
    }

    async fn submit(
        &mut self,
        api: &dyn FeedApi,
        content: &str,
        parent_comment_id: Option<String>,
    ) -> Result<CommentView, ClientError> {
        let request = CreateCommentRequest {
            content: content.trim().to_string(),
            parent_comment_id,
        };

        let created = match self
            .lifetime
            .guard(api.create_comment(&self.post_id, &request))
            .await
        {
            Ok(created) => created,
            Err(e) => {
                e.log("Posting comment");
                return Err(e);
            }
        };

        // The server may have re-parented a nested reply onto its top-level comment
        if let Some(parent) = &created.parent_comment_id {
            self.forced_visible.insert(parent.clone());
        }
        self.merge(created.comment.clone());
        self.unconfirmed.push(created.comment.clone());
        self.loaded = true;

        if let Err(e) = self.refresh(api).await {
            log::warn!("Comment {} saved but refetch failed: {}", created.comment.id, e);
        }
        Ok(created.comment)
    }
}
