//! # Event System
//!
//! In-process publish/subscribe used by every core component, feature module
//! and plugin.

pub mod bus;

pub use bus::{invoke_listener, listener, EventBus, EventEmitter, Listener, ListenerResult};
