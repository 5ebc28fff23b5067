//! Title-keyed accumulator of discovered topics.

use std::collections::{HashMap, HashSet};

use crate::topic::{Topic, slugify};

/// Result of a single [`TopicStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new topic was appended at this position.
    Inserted(usize),
    /// Contents were appended to the existing topic at this position.
    Merged(usize),
}

/// In-memory topic store.
///
/// Topics keep first-seen order. No two topics share a title, and no two
/// topics share an id. Nothing is ever removed or reordered.
#[derive(Debug, Clone, Default)]
pub struct TopicStore {
    topics: Vec<Topic>,
    by_title: HashMap<String, usize>,
    ids: HashSet<String>,
}

impl TopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new topic, or append its contents to the topic with the same title.
    ///
    /// On a merge the existing topic's id, importance and goal are left as they were.
    pub fn upsert(&mut self, candidate: Topic) -> Upsert {
        if let Some(&idx) = self.by_title.get(&candidate.title) {
            self.topics[idx].contents.extend(candidate.contents);
            return Upsert::Merged(idx);
        }

        let mut topic = candidate;
        topic.id = self.unique_id(&topic.id, &topic.title);
        self.ids.insert(topic.id.clone());

        let idx = self.topics.len();
        self.by_title.insert(topic.title.clone(), idx);
        self.topics.push(topic);
        Upsert::Inserted(idx)
    }

    fn unique_id(&self, proposed: &str, title: &str) -> String {
        let base = if proposed.trim().is_empty() {
            slugify(title)
        } else {
            proposed.trim().to_string()
        };
        if !self.ids.contains(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let id = format!("{base}_{n}");
            if !self.ids.contains(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Current titles in first-seen order.
    pub fn titles(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.title.as_str()).collect()
    }

    pub fn get(&self, title: &str) -> Option<&Topic> {
        self.by_title.get(title).map(|&idx| &self.topics[idx])
    }

    /// Total number of content bullets across all topics.
    pub fn content_count(&self) -> usize {
        self.topics.iter().map(|t| t.contents.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    pub fn into_topics(self) -> Vec<Topic> {
        self.topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Importance;

    fn topic(title: &str, contents: &[&str]) -> Topic {
        Topic::new(
            title,
            Importance::Medium,
            contents.iter().map(|s| s.to_string()).collect(),
            format!("Understand {title}"),
        )
    }

    #[test]
    fn merge_by_title_appends_contents() {
        let mut store = TopicStore::new();
        store.upsert(topic("Gradient Descent", &["b"]));
        let outcome = store.upsert(topic("Gradient Descent", &["a"]));

        assert_eq!(outcome, Upsert::Merged(0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Gradient Descent").unwrap().contents, ["b", "a"]);
    }

    #[test]
    fn merge_keeps_goal_and_importance() {
        let mut store = TopicStore::new();
        store.upsert(Topic::new("Intro", Importance::High, vec!["x".into()], "first"));
        store.upsert(Topic::new("Intro", Importance::Low, vec!["y".into()], "second"));

        let intro = store.get("Intro").unwrap();
        assert_eq!(intro.importance, Importance::High);
        assert_eq!(intro.goal, "first");
    }

    #[test]
    fn title_match_is_case_sensitive() {
        let mut store = TopicStore::new();
        store.upsert(topic("Backpropagation", &["a"]));
        store.upsert(topic("backpropagation", &["b"]));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicates_across_pages_are_kept() {
        let mut store = TopicStore::new();
        store.upsert(topic("Loss", &["same"]));
        store.upsert(topic("Loss", &["same"]));
        assert_eq!(store.get("Loss").unwrap().contents, ["same", "same"]);
        assert_eq!(store.content_count(), 2);
    }

    #[test]
    fn first_seen_order_preserved() {
        let mut store = TopicStore::new();
        for t in ["c", "a", "b", "a", "c"] {
            store.upsert(topic(t, &["x"]));
        }
        assert_eq!(store.titles(), ["c", "a", "b"]);
    }

    #[test]
    fn colliding_ids_get_suffix() {
        let mut store = TopicStore::new();
        store.upsert(topic("Neural Nets", &[]));
        store.upsert(topic("Neural-Nets", &[]));
        store.upsert(topic("neural nets", &[]));

        let ids: Vec<&str> = store.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["neural_nets", "neural_nets_2", "neural_nets_3"]);
    }

    #[test]
    fn empty_id_is_derived_from_title() {
        let mut store = TopicStore::new();
        let mut t = topic("Loss Functions", &[]);
        t.id = "  ".into();
        store.upsert(t);
        assert_eq!(store.iter().next().unwrap().id, "loss_functions");
    }

    #[test]
    fn no_duplicate_titles_after_many_upserts() {
        let mut store = TopicStore::new();
        let titles = ["a", "b", "a", "c", "b", "b", "d", "a"];
        for (i, t) in titles.iter().enumerate() {
            store.upsert(topic(t, &[&i.to_string()]));
        }
        let mut seen = HashSet::new();
        for t in store.iter() {
            assert!(seen.insert(t.title.clone()), "duplicate title {}", t.title);
        }
        assert_eq!(store.len(), 4);
        assert_eq!(store.content_count(), titles.len());
    }
}
