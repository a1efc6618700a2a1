use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::comment::model::{CommentView, CreateCommentRequest, CreatedComment};
use crate::feed::model::FeedItem;
use crate::follow::model::FollowStatus;
use crate::post::post_model::PostView;
use crate::reaction::model::{ReactionSnapshot, ReactionType};
use crate::utils::model::OwnerKind;

/// What a reaction request points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Post(String),
    Comment(String),
}

impl ReactionTarget {
    fn path(&self) -> String {
        match self {
            ReactionTarget::Post(id) => format!("/api/posts/{}/reaction", id),
            ReactionTarget::Comment(id) => format!("/api/comments/{}/reaction", id),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => id,
        }
    }
}

/// Backend calls the client components depend on.
#[async_trait]
pub trait FeedApi: Send + Sync {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>, ClientError>;

    async fn fetch_post(&self, post_id: &str) -> Result<PostView, ClientError>;

    /// Top-level comments of a post, each carrying its replies.
    async fn fetch_comments(&self, post_id: &str) -> Result<Vec<CommentView>, ClientError>;

    async fn create_comment(
        &self,
        post_id: &str,
        request: &CreateCommentRequest,
    ) -> Result<CreatedComment, ClientError>;

    /// `None` removes the caller's reaction.
    async fn react(
        &self,
        target: &ReactionTarget,
        reaction: Option<ReactionType>,
    ) -> Result<ReactionSnapshot, ClientError>;

    async fn check_follow(&self, id: &str, kind: OwnerKind) -> Result<bool, ClientError>;
}

#[derive(Deserialize)]
struct PostEnvelope {
    post: PostView,
}

#[derive(Deserialize)]
struct CommentsEnvelope {
    comments: Vec<CommentView>,
}

#[derive(Deserialize)]
struct FeedEnvelope {
    items: Vec<FeedItem>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// [`FeedApi`] over the REST backend.
#[derive(Debug, Clone)]
pub struct HttpFeedApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpFeedApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            log::warn!("API request failed with {}: {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>, ClientError> {
        let envelope: FeedEnvelope = self.send(self.client.get(self.url("/api/feed"))).await?;
        Ok(envelope.items)
    }

    async fn fetch_post(&self, post_id: &str) -> Result<PostView, ClientError> {
        let path = format!("/api/posts/{}", post_id);
        let envelope: PostEnvelope = self.send(self.client.get(self.url(&path))).await?;
        Ok(envelope.post)
    }

    async fn fetch_comments(&self, post_id: &str) -> Result<Vec<CommentView>, ClientError> {
        let path = format!("/api/posts/{}/comments", post_id);
        let envelope: CommentsEnvelope = self.send(self.client.get(self.url(&path))).await?;
        Ok(envelope.comments)
    }

    async fn create_comment(
        &self,
        post_id: &str,
        request: &CreateCommentRequest,
    ) -> Result<CreatedComment, ClientError> {
        let path = format!("/api/posts/{}/comments", post_id);
        self.send(self.client.post(self.url(&path)).json(request)).await
    }

    async fn react(
        &self,
        target: &ReactionTarget,
        reaction: Option<ReactionType>,
    ) -> Result<ReactionSnapshot, ClientError> {
        let body = json!({ "reactionType": reaction });
        self.send(self.client.post(self.url(&target.path())).json(&body)).await
    }

    async fn check_follow(&self, id: &str, kind: OwnerKind) -> Result<bool, ClientError> {
        let path = format!("/api/follow/check/{}", id);
        let request = self
            .client
            .post(self.url(&path))
            .query(&[("type", kind.as_str())]);
        let status: FollowStatus = self.send(request).await?;
        Ok(status.is_following)
    }
}
