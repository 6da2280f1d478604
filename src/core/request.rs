//! # Shutdown request and exclusion set.
//!
//! A [`ShutdownRequest`] is created once per signal delivery and never mutated.
//! Its [`ExclusionSet`] names the tasks the coordinator must leave alone; the
//! entrypoint puts its own name there so it is never cancelled mid-wait.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::signal::ShutdownSignal;

/// Task names exempt from cancellation during one shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<Arc<str>>,
}

impl ExclusionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set extended with `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<Arc<str>>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// True if `name` must not be cancelled.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(AsRef::as_ref)
    }
}

impl<S: Into<Arc<str>>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable `(signal, exclusion set)` pair handed to the coordinator.
///
/// `signal` is `None` when the shutdown is requested directly rather than by
/// an OS signal.
#[derive(Debug, Clone)]
pub struct ShutdownRequest {
    signal: Option<ShutdownSignal>,
    exclude: ExclusionSet,
}

impl ShutdownRequest {
    /// Request triggered by `signal`.
    pub fn new(signal: ShutdownSignal, exclude: ExclusionSet) -> Self {
        Self {
            signal: Some(signal),
            exclude,
        }
    }

    /// Request issued directly by code (no signal involved).
    pub fn direct(exclude: ExclusionSet) -> Self {
        Self {
            signal: None,
            exclude,
        }
    }

    pub fn signal(&self) -> Option<ShutdownSignal> {
        self.signal
    }

    pub fn exclude(&self) -> &ExclusionSet {
        &self.exclude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_lookup_by_name() {
        let set = ExclusionSet::from_iter(["main"]).with("metrics");
        assert!(set.contains("main"));
        assert!(set.contains("metrics"));
        assert!(!set.contains("worker-1"));
        assert_eq!(set.iter().collect::<Vec<_>>(), ["main", "metrics"]);
    }

    #[test]
    fn test_direct_request_has_no_signal() {
        let req = ShutdownRequest::direct(ExclusionSet::new());
        assert!(req.signal().is_none());
        assert!(req.exclude().is_empty());
    }
}
