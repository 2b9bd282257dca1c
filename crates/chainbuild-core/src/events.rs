//! Event tags supplied by the invoking context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An immutable set of opaque event tags.
///
/// Events only gate conditional successor steps; the core never interprets
/// their content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSet(BTreeSet<String>);

impl EventSet {
    pub fn new<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(events.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.0.contains(event)
    }

    /// True if at least one of `tags` is a member.
    pub fn intersects(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.0.contains(tag))
    }

    /// True if every one of `tags` is a member.
    pub fn contains_all(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.0.contains(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
