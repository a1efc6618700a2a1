use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::client::api::FeedApi;
use crate::client::error::ClientError;
use crate::client::lifetime::LifetimeToken;
use crate::post::post_model::PostView;

pub const POST_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// One poll result, stamped with when its request went out.
#[derive(Debug, Clone, PartialEq)]
pub struct PolledPost {
    pub post: PostView,
    pub requested_at: Instant,
}

/// Refetches one post on a fixed interval while its lifetime is alive.
pub struct PostPoller {
    api: Arc<dyn FeedApi>,
    post_id: String,
    interval: Duration,
}

impl PostPoller {
    pub fn new(api: Arc<dyn FeedApi>, post_id: impl Into<String>) -> Self {
        Self {
            api,
            post_id: post_id.into(),
            interval: POST_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling; the first fetch happens immediately.
    ///
    /// The task ends when `lifetime` is cancelled or every receiver is gone.
    pub fn spawn(self, lifetime: LifetimeToken) -> (watch::Receiver<Option<PolledPost>>, JoinHandle<()>) {
        let (sender, receiver) = watch::channel(None);

        let handle = tokio::spawn(async move {
            log::debug!("Polling post {} every {:?}", self.post_id, self.interval);
            let mut timer = interval(self.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = lifetime.cancelled() => break,
                    _ = sender.closed() => break,
                    _ = timer.tick() => {
                        let requested_at = Instant::now();
                        match lifetime.guard(self.api.fetch_post(&self.post_id)).await {
                            Ok(post) => {
                                sender.send_replace(Some(PolledPost { post, requested_at }));
                            }
                            Err(ClientError::Cancelled) => break,
                            Err(e) => log::warn!("Polling post {} failed: {}", self.post_id, e),
                        }
                    }
                }
            }

            log::debug!("Stopped polling post {}", self.post_id);
        });

        (receiver, handle)
    }
}
