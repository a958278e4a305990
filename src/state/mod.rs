//! # State Management
//!
//! Change-tracked key/value store with bounded undo history, per-key and
//! wildcard subscriptions, and memoized selectors.

pub mod history;
pub mod selector;
pub mod store;

pub use history::{History, HistoryRecord};
pub use selector::Selector;
pub use store::{subscriber, StateChange, StateStore, StateSubscriber, Subscription};
