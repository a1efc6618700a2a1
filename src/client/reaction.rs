use std::time::Duration;

use tokio::time::Instant;

use crate::client::api::{FeedApi, ReactionTarget};
use crate::client::error::ClientError;
use crate::client::lifetime::LifetimeToken;
use crate::comment::model::CommentView;
use crate::post::post_model::PostView;
use crate::reaction::model::{ReactionCounts, ReactionSnapshot, ReactionType};

/// Hover time before the picker opens.
pub const HOVER_OPEN_DELAY: Duration = Duration::from_millis(250);

/// After a click the picker stays shut for this long.
pub const CLICK_SUPPRESS_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Idle,
    HoverPending { opens_at: Instant },
    Open,
    ClickSuppressing { until: Instant },
}

/// Hover/click behavior of the reaction picker, driven by explicit instants.
#[derive(Debug, Clone)]
pub struct ReactionPicker {
    state: PickerState,
}

impl Default for ReactionPicker {
    fn default() -> Self {
        Self { state: PickerState::Idle }
    }
}

impl ReactionPicker {
    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PickerState::Open
    }

    pub fn pointer_enter(&mut self, now: Instant) {
        self.tick(now);
        if self.state == PickerState::Idle {
            self.state = PickerState::HoverPending {
                opens_at: now + HOVER_OPEN_DELAY,
            };
        }
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.tick(now);
        if matches!(self.state, PickerState::HoverPending { .. } | PickerState::Open) {
            self.state = PickerState::Idle;
        }
    }

    /// A click on the button or on a picker entry closes the picker.
    pub fn click(&mut self, now: Instant) {
        self.state = PickerState::ClickSuppressing {
            until: now + CLICK_SUPPRESS_WINDOW,
        };
    }

    /// Advance timers; returns whether the picker is open.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            PickerState::HoverPending { opens_at } if now >= opens_at => {
                self.state = PickerState::Open;
            }
            PickerState::ClickSuppressing { until } if now >= until => {
                self.state = PickerState::Idle;
            }
            _ => {}
        }
        self.is_open()
    }

    /// When the next timed transition is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            PickerState::HoverPending { opens_at } => Some(opens_at),
            PickerState::ClickSuppressing { until } => Some(until),
            PickerState::Idle | PickerState::Open => None,
        }
    }
}

/// The reaction button of one post or comment.
///
/// Counts are only ever taken from server snapshots.
#[derive(Debug)]
pub struct ReactionControl {
    target: ReactionTarget,
    lifetime: LifetimeToken,
    confirmed: ReactionSnapshot,
    pending: Option<Option<ReactionType>>,
    /// When the last reaction request was confirmed by the server.
    confirmed_at: Option<Instant>,
    pulsing: bool,
    picker: ReactionPicker,
}

impl ReactionControl {
    pub fn new(target: ReactionTarget, initial: ReactionSnapshot, lifetime: LifetimeToken) -> Self {
        Self {
            target,
            lifetime,
            confirmed: initial,
            pending: None,
            confirmed_at: None,
            pulsing: false,
            picker: ReactionPicker::default(),
        }
    }

    pub fn for_post(post: &PostView, lifetime: LifetimeToken) -> Self {
        let snapshot = ReactionSnapshot {
            current_reaction: post.current_reaction,
            reactions_count: post.reactions_count.clone(),
        };
        Self::new(ReactionTarget::Post(post.id.clone()), snapshot, lifetime)
    }

    pub fn for_comment(comment: &CommentView, lifetime: LifetimeToken) -> Self {
        let snapshot = ReactionSnapshot {
            current_reaction: comment.current_reaction,
            reactions_count: comment.reactions_count.clone(),
        };
        Self::new(ReactionTarget::Comment(comment.id.clone()), snapshot, lifetime)
    }

    pub fn target(&self) -> &ReactionTarget {
        &self.target
    }

    /// Reaction shown on the button, including an in-flight choice.
    pub fn displayed_reaction(&self) -> Option<ReactionType> {
        self.pending.unwrap_or(self.confirmed.current_reaction)
    }

    pub fn current_reaction(&self) -> Option<ReactionType> {
        self.confirmed.current_reaction
    }

    pub fn counts(&self) -> &ReactionCounts {
        &self.confirmed.reactions_count
    }

    pub fn total(&self) -> u64 {
        self.confirmed.reactions_count.values().sum()
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulsing
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn picker(&self) -> &ReactionPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut ReactionPicker {
        &mut self.picker
    }

    /// What a click on the main button asks for: like, or clearing an existing reaction.
    pub fn primary_choice(&self) -> Option<ReactionType> {
        match self.confirmed.current_reaction {
            Some(_) => None,
            None => Some(ReactionType::Like),
        }
    }

    pub async fn click_primary(
        &mut self,
        api: &dyn FeedApi,
        now: Instant,
    ) -> Result<ReactionSnapshot, ClientError> {
        self.picker.click(now);
        let choice = self.primary_choice();
        self.set_reaction(api, choice).await
    }

    /// Pick a type from the open picker.
    pub async fn choose(
        &mut self,
        api: &dyn FeedApi,
        kind: ReactionType,
        now: Instant,
    ) -> Result<ReactionSnapshot, ClientError> {
        self.picker.click(now);
        self.set_reaction(api, Some(kind)).await
    }

    pub async fn set_reaction(
        &mut self,
        api: &dyn FeedApi,
        choice: Option<ReactionType>,
    ) -> Result<ReactionSnapshot, ClientError> {
        self.pulsing = true;
        self.pending = Some(choice);

        let result = self.lifetime.guard(api.react(&self.target, choice)).await;

        self.pulsing = false;
        self.pending = None;
        match result {
            Ok(snapshot) => {
                self.confirmed = snapshot.clone();
                self.confirmed_at = Some(Instant::now());
                Ok(snapshot)
            }
            Err(e) => {
                e.log("Reacting");
                Err(e)
            }
        }
    }

    /// Take a snapshot read elsewhere (a polled post) by a request issued at `requested_at`.
    ///
    /// Reads issued before our last confirmed reaction are stale and dropped.
    pub fn apply_snapshot(&mut self, snapshot: ReactionSnapshot, requested_at: Instant) -> bool {
        if self.confirmed_at.is_some_and(|confirmed| requested_at <= confirmed) {
            log::debug!("Dropping stale reaction snapshot for {:?}", self.target);
            return false;
        }
        self.confirmed = snapshot;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;
    use crate::client::lifetime::Lifetime;
    use crate::reaction::model::empty_counts;
    use std::sync::atomic::Ordering;

    fn control(lifetime: &Lifetime) -> ReactionControl {
        let snapshot = ReactionSnapshot {
            current_reaction: None,
            reactions_count: empty_counts(),
        };
        ReactionControl::new(ReactionTarget::Post("p1".into()), snapshot, lifetime.token())
    }

    #[tokio::test]
    async fn primary_click_toggles_like_through_server() {
        let api = FakeApi::new();
        let lifetime = Lifetime::new();
        let mut control = control(&lifetime);
        let now = Instant::now();
        let before = control.counts()[&ReactionType::Like];

        let liked = control.click_primary(&api, now).await.unwrap();
        assert_eq!(liked.current_reaction, Some(ReactionType::Like));
        assert_eq!(control.counts()[&ReactionType::Like], before + 1);
        assert!(!control.is_pulsing());

        let cleared = control.click_primary(&api, now + Duration::from_secs(1)).await.unwrap();
        assert_eq!(cleared.current_reaction, None);
        assert_eq!(control.current_reaction(), None);
        assert_eq!(control.counts()[&ReactionType::Like], before);
    }

    #[tokio::test]
    async fn choosing_switches_type_without_double_counting() {
        let api = FakeApi::new();
        let lifetime = Lifetime::new();
        let mut control = control(&lifetime);
        let now = Instant::now();

        control.choose(&api, ReactionType::Funny, now).await.unwrap();
        control.choose(&api, ReactionType::Love, now).await.unwrap();

        assert_eq!(control.current_reaction(), Some(ReactionType::Love));
        assert_eq!(control.counts()[&ReactionType::Funny], 0);
        assert_eq!(control.counts()[&ReactionType::Love], 1);
        assert_eq!(control.total(), 1);
        assert_eq!(control.primary_choice(), None);
    }

    #[tokio::test]
    async fn failure_restores_previous_state() {
        let api = FakeApi::new();
        let lifetime = Lifetime::new();
        let mut control = control(&lifetime);
        let now = Instant::now();
        control.choose(&api, ReactionType::Support, now).await.unwrap();

        api.fail_next.store(true, Ordering::SeqCst);
        let err = control.click_primary(&api, now).await.unwrap_err();

        assert!(matches!(err, ClientError::Api { .. }));
        assert_eq!(control.displayed_reaction(), Some(ReactionType::Support));
        assert_eq!(control.counts()[&ReactionType::Support], 1);
        assert!(!control.is_pulsing());
        assert!(!control.is_pending());
    }

    #[tokio::test]
    async fn dead_lifetime_leaves_state_alone() {
        let api = FakeApi::new();
        let lifetime = Lifetime::new();
        let mut control = control(&lifetime);
        lifetime.cancel();

        let err = control.set_reaction(&api, Some(ReactionType::Like)).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(control.current_reaction(), None);
    }

    #[test]
    fn polled_snapshot_replaces_confirmed_state() {
        let lifetime = Lifetime::new();
        let mut control = control(&lifetime);
        let mut counts = empty_counts();
        counts.insert(ReactionType::Celebrate, 4);

        let applied = control.apply_snapshot(
            ReactionSnapshot {
                current_reaction: Some(ReactionType::Celebrate),
                reactions_count: counts,
            },
            Instant::now(),
        );
        assert!(applied);
        assert_eq!(control.total(), 4);
        assert_eq!(control.displayed_reaction(), Some(ReactionType::Celebrate));
    }

    #[tokio::test(start_paused = true)]
    async fn reads_older_than_the_last_click_are_dropped() {
        let api = FakeApi::new();
        let lifetime = Lifetime::new();
        let mut control = control(&lifetime);
        let read_before_click = Instant::now();
        let stale = ReactionSnapshot {
            current_reaction: None,
            reactions_count: empty_counts(),
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        control.click_primary(&api, Instant::now()).await.unwrap();

        assert!(!control.apply_snapshot(stale.clone(), read_before_click));
        assert_eq!(control.current_reaction(), Some(ReactionType::Like));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(control.apply_snapshot(stale, Instant::now()));
        assert_eq!(control.current_reaction(), None);
    }

    #[test]
    fn hover_opens_after_delay() {
        let mut picker = ReactionPicker::default();
        let start = Instant::now();

        picker.pointer_enter(start);
        assert!(!picker.tick(start + Duration::from_millis(249)));
        assert_eq!(picker.next_deadline(), Some(start + HOVER_OPEN_DELAY));
        assert!(picker.tick(start + HOVER_OPEN_DELAY));

        picker.pointer_leave(start + Duration::from_millis(400));
        assert_eq!(picker.state(), PickerState::Idle);
    }

    #[test]
    fn leaving_before_delay_cancels_open() {
        let mut picker = ReactionPicker::default();
        let start = Instant::now();

        picker.pointer_enter(start);
        picker.pointer_leave(start + Duration::from_millis(100));
        assert!(!picker.tick(start + Duration::from_secs(1)));
    }

    #[test]
    fn click_suppresses_hover_for_window() {
        let mut picker = ReactionPicker::default();
        let start = Instant::now();

        picker.pointer_enter(start);
        picker.tick(start + HOVER_OPEN_DELAY);
        picker.click(start + Duration::from_millis(300));
        assert!(!picker.is_open());

        // Re-entering inside the window does nothing
        picker.pointer_enter(start + Duration::from_millis(450));
        assert!(!picker.tick(start + Duration::from_millis(590)));

        // After the window a fresh hover works again
        picker.pointer_enter(start + Duration::from_millis(600));
        assert!(matches!(picker.state(), PickerState::HoverPending { .. }));
        assert!(picker.tick(start + Duration::from_millis(850)));
    }
}
