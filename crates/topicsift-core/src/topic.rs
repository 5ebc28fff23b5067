//! Topic data model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// How central a topic is to the document.
///
/// Ordered so that sorting ascending puts `High` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A topic discovered in the document.
///
/// `title` is the merge key. `id` is kept unique by the [`TopicStore`](crate::TopicStore)
/// but never used to decide whether two topics are the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub importance: Importance,
    pub contents: Vec<String>,
    pub goal: String,
}

impl Topic {
    pub fn new(
        title: impl Into<String>,
        importance: Importance,
        contents: Vec<String>,
        goal: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            id: slugify(&title),
            title,
            importance,
            contents,
            goal: goal.into(),
        }
    }
}

/// Derive a snake_case identifier from a title.
///
/// Returns `"topic"` when the title has no ASCII alphanumerics at all.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lower, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "topic".to_string()
    } else {
        slug.to_string()
    }
}

/// Stable sort by importance (high first), keeping discovery order within a level.
///
/// Presentation helper for callers; extraction itself never reorders topics.
pub fn sort_by_importance(topics: &mut [Topic]) {
    topics.sort_by_key(|t| t.importance);
}
