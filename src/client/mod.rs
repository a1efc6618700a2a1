//! Client-side feed core: the state behind the comment tree, reaction buttons,
//! notification banners, the feed timeline and the post-detail view.
//!
//! Everything talks to the backend through [`api::FeedApi`] and is bound to a
//! [`lifetime::LifetimeToken`], so results arriving after a view is gone are dropped.

pub mod api;
pub mod banner;
pub mod comment_tree;
pub mod config;
pub mod error;
pub mod feed;
pub mod lifetime;
pub mod poller;
pub mod post_detail;
pub mod reaction;

#[cfg(test)]
pub(crate) mod fake;
