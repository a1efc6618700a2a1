use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::api::FeedApi;
use crate::client::comment_tree::CommentThread;
use crate::client::error::ClientError;
use crate::client::lifetime::Lifetime;
use crate::client::poller::{POST_POLL_INTERVAL, PolledPost, PostPoller};
use crate::client::reaction::ReactionControl;
use crate::post::post_model::PostView;
use crate::reaction::model::ReactionSnapshot;

/// An open post: live snapshot, its comment thread and its reaction button.
///
/// Dropping it stops polling and discards any response still in flight.
pub struct PostDetail {
    lifetime: Lifetime,
    api: Arc<dyn FeedApi>,
    updates: watch::Receiver<Option<PolledPost>>,
    poller: JoinHandle<()>,
    post: Option<PostView>,
    reaction: Option<ReactionControl>,
    pub comments: CommentThread,
}

impl PostDetail {
    pub fn open(api: Arc<dyn FeedApi>, post_id: &str) -> Self {
        Self::open_with_interval(api, post_id, POST_POLL_INTERVAL)
    }

    pub fn open_with_interval(api: Arc<dyn FeedApi>, post_id: &str, interval: Duration) -> Self {
        let lifetime = Lifetime::new();
        let (updates, poller) = PostPoller::new(api.clone(), post_id)
            .with_interval(interval)
            .spawn(lifetime.token());
        let comments = CommentThread::new(post_id, lifetime.token());

        Self {
            lifetime,
            api,
            updates,
            poller,
            post: None,
            reaction: None,
            comments,
        }
    }

    pub fn post(&self) -> Option<&PostView> {
        self.post.as_ref()
    }

    pub fn reaction(&self) -> Option<&ReactionControl> {
        self.reaction.as_ref()
    }

    pub fn reaction_mut(&mut self) -> Option<&mut ReactionControl> {
        self.reaction.as_mut()
    }

    pub fn api(&self) -> &dyn FeedApi {
        self.api.as_ref()
    }

    /// Take the newest polled snapshot, if one arrived since the last call.
    pub fn sync(&mut self) -> bool {
        if !self.updates.has_changed().unwrap_or(false) {
            return false;
        }
        let polled = self.updates.borrow_and_update().clone();
        polled.is_some_and(|polled| self.apply(polled))
    }

    /// Wait for the next polled snapshot and apply it.
    pub async fn next_update(&mut self) -> Result<bool, ClientError> {
        self.updates.changed().await.map_err(|_| ClientError::Cancelled)?;
        let polled = self.updates.borrow_and_update().clone();
        Ok(polled.is_some_and(|polled| self.apply(polled)))
    }

    /// Fold one poll into the view; the reaction part is skipped when it predates our last click.
    fn apply(&mut self, polled: PolledPost) -> bool {
        let PolledPost { post, requested_at } = polled;
        let snapshot = ReactionSnapshot {
            current_reaction: post.current_reaction,
            reactions_count: post.reactions_count.clone(),
        };

        let fresh = match self.reaction.as_mut() {
            Some(control) => control.apply_snapshot(snapshot, requested_at),
            None => {
                self.reaction = Some(ReactionControl::for_post(&post, self.lifetime.token()));
                true
            }
        };
        self.post = Some(post);
        fresh
    }

    pub async fn expand_comments(&mut self) -> Result<(), ClientError> {
        self.comments.set_expanded(self.api.as_ref(), true).await
    }

    pub async fn reply(&mut self, parent_id: &str, content: &str) -> Result<(), ClientError> {
        self.comments
            .submit_reply(self.api.as_ref(), parent_id, content)
            .await
            .map(|_| ())
    }

    /// Cancel everything bound to this view and wait for the poller to stop.
    pub async fn close(self) {
        let PostDetail { lifetime, poller, .. } = self;
        lifetime.cancel();
        if let Err(e) = poller.await {
            log::warn!("Post poller ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeApi, comment, owner, post};
    use crate::reaction::model::ReactionType;
    use crate::utils::model::OwnerKind;
    use std::sync::atomic::Ordering;
    use tokio::time::Instant;

    fn api() -> Arc<FakeApi> {
        Arc::new(
            FakeApi::new()
                .with_post(post("p1", owner(OwnerKind::User, "u", "U"), Vec::new()))
                .with_comments(vec![comment("c1", "p1", None)]),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn next_update_applies_the_polled_post() {
        let api = api();
        let mut detail = PostDetail::open(api.clone(), "p1");

        assert!(detail.next_update().await.unwrap());
        assert_eq!(detail.post().map(|p| p.id.as_str()), Some("p1"));
        assert!(detail.reaction().is_some());

        api.set_post_content("p1", "nova versão");
        tokio::time::sleep(POST_POLL_INTERVAL).await;
        detail.next_update().await.unwrap();
        assert_eq!(
            detail.post().and_then(|p| p.content.as_deref()),
            Some("nova versão")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn detail_tracks_polls_and_stops_when_closed() {
        let api = api();
        let mut detail = PostDetail::open(api.clone(), "p1");

        detail.next_update().await.unwrap();
        detail.expand_comments().await.unwrap();
        detail.reply("c1", "Parabéns").await.unwrap();
        assert!(detail.comments.replies_visible("c1"));

        let fetched = api.post_fetches.load(Ordering::SeqCst);
        detail.close().await;
        tokio::time::sleep(POST_POLL_INTERVAL * 3).await;
        assert_eq!(api.post_fetches.load(Ordering::SeqCst), fetched);
    }

    #[tokio::test(start_paused = true)]
    async fn click_updates_reaction_between_polls() {
        let api = api();
        let mut detail = PostDetail::open(api.clone(), "p1");
        detail.next_update().await.unwrap();

        let shared = api.clone();
        let control = detail.reaction_mut().unwrap();
        control.click_primary(shared.as_ref(), Instant::now()).await.unwrap();
        assert_eq!(control.current_reaction(), Some(ReactionType::Like));
        assert!(!detail.sync());
    }

    #[tokio::test(start_paused = true)]
    async fn unsynced_poll_from_before_a_click_does_not_revert_it() {
        let api = api();
        let mut detail = PostDetail::open(api.clone(), "p1");
        detail.next_update().await.unwrap();

        // A poll lands but the view has not synced it yet
        tokio::time::sleep(POST_POLL_INTERVAL).await;
        while api.post_fetches.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        let shared = api.clone();
        detail
            .reaction_mut()
            .unwrap()
            .click_primary(shared.as_ref(), Instant::now())
            .await
            .unwrap();

        detail.sync();
        assert_eq!(
            detail.reaction().and_then(ReactionControl::current_reaction),
            Some(ReactionType::Like)
        );
    }
}
