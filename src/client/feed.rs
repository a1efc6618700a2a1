use std::collections::HashMap;

use tokio::time::Instant;

use crate::client::api::FeedApi;
use crate::client::banner::{Banner, classify, load_follow_set};
use crate::client::error::ClientError;
use crate::client::lifetime::LifetimeToken;
use crate::client::reaction::ReactionControl;
use crate::feed::model::FeedItem;
use crate::reaction::model::{ReactionSnapshot, ReactionType};
use crate::utils::model::OwnerView;

/// The home timeline: fetched once, one reaction control per post.
#[derive(Debug)]
pub struct FeedTimeline {
    lifetime: LifetimeToken,
    items: Vec<FeedItem>,
    reactions: HashMap<String, ReactionControl>,
    banners: HashMap<String, Banner>,
    loaded: bool,
}

impl FeedTimeline {
    pub fn new(lifetime: LifetimeToken) -> Self {
        Self {
            lifetime,
            items: Vec::new(),
            reactions: HashMap::new(),
            banners: HashMap::new(),
            loaded: false,
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch the timeline unless it is already loaded.
    pub async fn load(&mut self, api: &dyn FeedApi) -> Result<(), ClientError> {
        if self.loaded {
            return Ok(());
        }
        self.reload(api).await
    }

    pub async fn reload(&mut self, api: &dyn FeedApi) -> Result<(), ClientError> {
        let items = match self.lifetime.guard(api.fetch_feed()).await {
            Ok(items) => items,
            Err(e) => {
                e.log("Loading feed");
                return Err(e);
            }
        };

        self.reactions = items
            .iter()
            .filter_map(FeedItem::as_post)
            .map(|post| (post.id.clone(), ReactionControl::for_post(post, self.lifetime.clone())))
            .collect();
        self.banners.clear();
        self.items = items;
        self.loaded = true;
        log::debug!("Feed loaded with {} items", self.items.len());
        Ok(())
    }

    /// Resolve follow state for every post and label it.
    pub async fn load_banners(&mut self, api: &dyn FeedApi, viewer: &OwnerView) -> Result<(), ClientError> {
        let mut banners = HashMap::new();
        for post in self.items.iter().filter_map(FeedItem::as_post) {
            let follows = load_follow_set(api, post, viewer, &self.lifetime).await?;
            if let Some(banner) = classify(post, viewer, &follows) {
                banners.insert(post.id.clone(), banner);
            }
        }
        self.banners = banners;
        Ok(())
    }

    pub fn banner(&self, post_id: &str) -> Option<&Banner> {
        self.banners.get(post_id)
    }

    pub fn reaction(&self, post_id: &str) -> Option<&ReactionControl> {
        self.reactions.get(post_id)
    }

    pub fn reaction_mut(&mut self, post_id: &str) -> Option<&mut ReactionControl> {
        self.reactions.get_mut(post_id)
    }

    fn control(&mut self, post_id: &str) -> Result<&mut ReactionControl, ClientError> {
        self.reactions.get_mut(post_id).ok_or_else(|| ClientError::Api {
            status: 404,
            message: format!("Post {} is not on this timeline", post_id),
        })
    }

    pub async fn click_reaction(
        &mut self,
        api: &dyn FeedApi,
        post_id: &str,
        now: Instant,
    ) -> Result<ReactionSnapshot, ClientError> {
        self.control(post_id)?.click_primary(api, now).await
    }

    pub async fn choose_reaction(
        &mut self,
        api: &dyn FeedApi,
        post_id: &str,
        kind: ReactionType,
        now: Instant,
    ) -> Result<ReactionSnapshot, ClientError> {
        self.control(post_id)?.choose(api, kind, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeApi, owner, post};
    use crate::client::lifetime::Lifetime;
    use crate::utils::model::OwnerKind;

    #[tokio::test]
    async fn timeline_routes_reactions_to_each_post() {
        let author = owner(OwnerKind::Company, "acme", "Acme");
        let api = FakeApi::new()
            .with_post(post("p1", author.clone(), Vec::new()))
            .with_post(post("p2", author, Vec::new()));
        let lifetime = Lifetime::new();
        let mut feed = FeedTimeline::new(lifetime.token());

        feed.load(&api).await.unwrap();
        assert_eq!(feed.items().len(), 2);

        feed.click_reaction(&api, "p2", Instant::now()).await.unwrap();
        assert_eq!(feed.reaction("p2").unwrap().current_reaction(), Some(ReactionType::Like));
        assert_eq!(feed.reaction("p1").unwrap().current_reaction(), None);

        let err = feed.click_reaction(&api, "nope", Instant::now()).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn banners_follow_the_network() {
        let ana = owner(OwnerKind::User, "a", "A");
        let author = owner(OwnerKind::User, "author", "Caio");
        let api = FakeApi::new().with_post(post("p1", author, vec![(ana, ReactionType::Love)]));
        api.follow(OwnerKind::User, "a");

        let lifetime = Lifetime::new();
        let mut feed = FeedTimeline::new(lifetime.token());
        let viewer = owner(OwnerKind::User, "viewer", "Você");
        feed.load(&api).await.unwrap();

        feed.load_banners(&api, &viewer).await.unwrap();
        assert_eq!(feed.banner("p1"), Some(&Banner::Suggestion));

        api.follow(OwnerKind::User, "author");
        feed.load_banners(&api, &viewer).await.unwrap();
        assert_eq!(feed.banner("p1").map(Banner::label).as_deref(), Some("A adorou isso"));
    }

    #[tokio::test]
    async fn failed_load_can_be_retried() {
        let api = FakeApi::new().with_post(post("p1", owner(OwnerKind::User, "u", "U"), Vec::new()));
        api.fail_next.store(true, std::sync::atomic::Ordering::SeqCst);
        let lifetime = Lifetime::new();
        let mut feed = FeedTimeline::new(lifetime.token());

        assert!(feed.load(&api).await.is_err());
        assert!(!feed.is_loaded());
        feed.load(&api).await.unwrap();
        assert_eq!(feed.items().len(), 1);
    }
}
