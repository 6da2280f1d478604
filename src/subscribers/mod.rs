//! # Event subscribers for the harness runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and (feature `logging`) the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Worker / Coordinator ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                               │
//!                                                                   ┌───────────┼──────────┐
//!                                                                   ▼           ▼          ▼
//!                                                               LogWriter    Metrics    Custom
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
