//! In-memory backend for exercising the client components.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::client::api::{FeedApi, ReactionTarget};
use crate::client::error::ClientError;
use crate::comment::model::{CommentView, CreateCommentRequest, CreatedComment};
use crate::feed::model::FeedItem;
use crate::post::post_model::PostView;
use crate::reaction::model::{ReactionSnapshot, ReactionType, ReactionView, empty_counts};
use crate::utils::model::{OwnerKind, OwnerView};

pub fn owner(kind: OwnerKind, id: &str, name: &str) -> OwnerView {
    OwnerView {
        kind,
        id: id.to_string(),
        name: Some(name.to_string()),
    }
}

pub fn comment(id: &str, post_id: &str, parent: Option<&str>) -> CommentView {
    CommentView {
        id: id.to_string(),
        post_id: post_id.to_string(),
        author: owner(OwnerKind::User, "author", "Autor"),
        content: format!("comentário {}", id),
        parent_comment_id: parent.map(str::to_string),
        reactions_count: empty_counts(),
        current_reaction: None,
        replies: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn post(id: &str, author: OwnerView, reactions: Vec<(OwnerView, ReactionType)>) -> PostView {
    let mut counts = empty_counts();
    for (_, kind) in &reactions {
        *counts.entry(*kind).or_insert(0) += 1;
    }
    PostView {
        id: id.to_string(),
        author,
        content: Some(format!("post {}", id)),
        media_url: None,
        reactions: reactions
            .into_iter()
            .map(|(owner, kind)| ReactionView { owner, kind })
            .collect(),
        reactions_count: counts,
        current_reaction: None,
        comments_count: 0,
        shares_count: 0,
        is_highlighted: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[derive(Default)]
struct State {
    posts: HashMap<String, PostView>,
    feed: Vec<FeedItem>,
    /// Flat, oldest first.
    comments: Vec<CommentView>,
    /// Written but not yet visible to reads.
    unpublished: Vec<CommentView>,
    reactions: HashMap<ReactionTarget, ReactionSnapshot>,
    follows: HashSet<(OwnerKind, String)>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
    next_id: AtomicUsize,
    /// Fail the next call with a 500.
    pub fail_next: AtomicBool,
    /// Writes become visible one read late.
    pub lagging_reads: AtomicBool,
    pub comment_fetches: AtomicUsize,
    pub post_fetches: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comments(self, comments: Vec<CommentView>) -> Self {
        self.state.lock().unwrap().comments = comments;
        self
    }

    pub fn with_post(self, post: PostView) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.feed.push(FeedItem::Post(post.clone()));
            state.posts.insert(post.id.clone(), post);
        }
        self
    }

    pub fn follow(&self, kind: OwnerKind, id: &str) {
        self.state.lock().unwrap().follows.insert((kind, id.to_string()));
    }

    pub fn remove_comment(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .comments
            .retain(|c| c.id != id && c.parent_comment_id.as_deref() != Some(id));
    }

    pub fn set_post_content(&self, id: &str, content: &str) {
        if let Some(post) = self.state.lock().unwrap().posts.get_mut(id) {
            post.content = Some(content.to_string());
        }
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                message: "Internal Server Error: simulated".into(),
            });
        }
        Ok(())
    }
}

fn build_tree(flat: &[CommentView], post_id: &str) -> Vec<CommentView> {
    let mut roots: Vec<CommentView> = flat
        .iter()
        .filter(|c| c.post_id == post_id && c.parent_comment_id.is_none())
        .cloned()
        .collect();
    for reply in flat.iter().filter(|c| c.post_id == post_id) {
        if let Some(parent) = &reply.parent_comment_id {
            if let Some(root) = roots.iter_mut().find(|r| &r.id == parent) {
                root.replies.push(reply.clone());
            }
        }
    }
    roots
}

#[async_trait]
impl FeedApi for FakeApi {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>, ClientError> {
        self.check_failure()?;
        Ok(self.state.lock().unwrap().feed.clone())
    }

    async fn fetch_post(&self, post_id: &str) -> Result<PostView, ClientError> {
        self.post_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.state
            .lock()
            .unwrap()
            .posts
            .get(post_id)
            .cloned()
            .ok_or(ClientError::Api {
                status: 404,
                message: "Not Found: Post not found".into(),
            })
    }

    async fn fetch_comments(&self, post_id: &str) -> Result<Vec<CommentView>, ClientError> {
        self.comment_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        let tree = build_tree(&state.comments, post_id);
        let published = std::mem::take(&mut state.unpublished);
        state.comments.extend(published);
        Ok(tree)
    }

    async fn create_comment(
        &self,
        post_id: &str,
        request: &CreateCommentRequest,
    ) -> Result<CreatedComment, ClientError> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();

        // Replies to replies hang off the top-level comment
        let parent = match &request.parent_comment_id {
            None => None,
            Some(parent_id) => {
                let parent = state
                    .comments
                    .iter()
                    .chain(state.unpublished.iter())
                    .find(|c| &c.id == parent_id)
                    .ok_or(ClientError::Api {
                        status: 404,
                        message: "Not Found: Parent comment not found".into(),
                    })?;
                Some(parent.parent_comment_id.clone().unwrap_or_else(|| parent.id.clone()))
            }
        };

        let id = format!("new{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut created = comment(&id, post_id, parent.as_deref());
        created.content = request.content.clone();

        if self.lagging_reads.load(Ordering::SeqCst) {
            state.unpublished.push(created.clone());
        } else {
            state.comments.push(created.clone());
        }
        Ok(CreatedComment {
            parent_comment_id: created.parent_comment_id.clone(),
            comment: created,
        })
    }

    async fn react(
        &self,
        target: &ReactionTarget,
        reaction: Option<ReactionType>,
    ) -> Result<ReactionSnapshot, ClientError> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        let snapshot = state
            .reactions
            .entry(target.clone())
            .or_insert_with(|| ReactionSnapshot {
                current_reaction: None,
                reactions_count: empty_counts(),
            });

        if let Some(previous) = snapshot.current_reaction.take() {
            if let Some(count) = snapshot.reactions_count.get_mut(&previous) {
                *count = count.saturating_sub(1);
            }
        }
        if let Some(kind) = reaction {
            *snapshot.reactions_count.entry(kind).or_insert(0) += 1;
        }
        snapshot.current_reaction = reaction;
        Ok(snapshot.clone())
    }

    async fn check_follow(&self, id: &str, kind: OwnerKind) -> Result<bool, ClientError> {
        self.check_failure()?;
        Ok(self.state.lock().unwrap().follows.contains(&(kind, id.to_string())))
    }
}
