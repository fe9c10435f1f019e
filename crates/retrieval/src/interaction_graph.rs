//! Interaction Graph - collaborative filtering over user likes.
//!
//! Bipartite user <-> item structure fed by `like` and `purchase` events.
//! `view` and unrecognized events are accepted upstream but never change the
//! graph.
//!
//! ## Ordering
//! Edge lists are kept in insertion order (first like wins the slot), so the
//! `max_users_per_item` / `max_likes_per_user` truncations and therefore the
//! collaborative scores are reproducible run to run.
//!
//! ## Algorithm (two-hop expansion)
//! 1. For each liked item, take its first `max_users_per_item` likers
//! 2. For each such user, take their first `max_likes_per_user` items
//! 3. Skip items in the input like set
//! 4. Add `user_weight * item_weight` to the candidate, where
//!    `user_weight = 1 / ln(1 + likes of that user)` and
//!    `item_weight = 1 / ln(1 + popularity of the candidate)`
//! 5. Return the top `limit` by score
//!
//! The graph only grows. [`RetentionPolicy`] is the hook for deployments
//! that need to keep it bounded.

use catalog::{Interaction, InteractionEvent, ItemKey, UserId};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, instrument};

/// Decides whether a positive event is admitted into the graph.
pub trait RetentionPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn admit(&self, interaction: &Interaction) -> bool;
}

/// Admits every event
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl RetentionPolicy for KeepAll {
    fn name(&self) -> &str {
        "KeepAll"
    }

    fn admit(&self, _interaction: &Interaction) -> bool {
        true
    }
}

/// Admits events at or after a unix timestamp. Events without a timestamp
/// are admitted.
#[derive(Debug, Clone, Copy)]
pub struct MinTimestamp(pub i64);

impl RetentionPolicy for MinTimestamp {
    fn name(&self) -> &str {
        "MinTimestamp"
    }

    fn admit(&self, interaction: &Interaction) -> bool {
        interaction.ts.is_none_or(|ts| ts >= self.0)
    }
}

/// Set that iterates in insertion order
#[derive(Debug, Clone)]
pub(crate) struct OrderedSet<T> {
    items: Vec<T>,
    members: HashSet<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            members: HashSet::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    pub(crate) fn insert(&mut self, value: T) -> bool {
        if self.members.insert(value.clone()) {
            self.items.push(value);
            true
        } else {
            false
        }
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// `1 / ln(1 + count)`, or 1 when the logarithm is 0
fn dampening(count: usize) -> f32 {
    let denom = (1.0 + count as f32).ln();
    if denom == 0.0 { 1.0 } else { 1.0 / denom }
}

pub struct InteractionGraph {
    user_likes: HashMap<UserId, OrderedSet<ItemKey>>,
    item_liked_by: HashMap<ItemKey, OrderedSet<UserId>>,
    item_popularity: HashMap<ItemKey, u64>,
    /// Items in the order they first gained popularity
    item_order: Vec<ItemKey>,
    total_events: u64,
    retention: Box<dyn RetentionPolicy>,
}

impl Default for InteractionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self {
            user_likes: HashMap::new(),
            item_liked_by: HashMap::new(),
            item_popularity: HashMap::new(),
            item_order: Vec::new(),
            total_events: 0,
            retention: Box::new(KeepAll),
        }
    }

    /// Configure the retention policy (default: [`KeepAll`])
    pub fn with_retention(mut self, policy: impl RetentionPolicy + 'static) -> Self {
        self.retention = Box::new(policy);
        self
    }

    pub fn retention_policy(&self) -> &str {
        self.retention.name()
    }

    /// Record one event. No-op unless the event is a like or purchase.
    ///
    /// Returns `true` when the graph changed. Repeated likes of the same
    /// item keep a single edge but still raise its popularity.
    pub fn add_interaction(&mut self, user_id: UserId, item_key: &ItemKey, event: InteractionEvent) -> bool {
        if !event.is_positive() {
            return false;
        }

        self.user_likes
            .entry(user_id)
            .or_default()
            .insert(item_key.clone());
        self.item_liked_by
            .entry(item_key.clone())
            .or_default()
            .insert(user_id);

        let popularity = self.item_popularity.entry(item_key.clone()).or_insert(0);
        if *popularity == 0 {
            self.item_order.push(item_key.clone());
        }
        *popularity += 1;
        self.total_events += 1;
        true
    }

    /// Retention check followed by [`InteractionGraph::add_interaction`]
    pub fn ingest(&mut self, interaction: &Interaction) -> bool {
        if !interaction.event.is_positive() || !self.retention.admit(interaction) {
            return false;
        }
        self.add_interaction(interaction.user_id, &interaction.key(), interaction.event)
    }

    // Getters

    pub fn popularity(&self, item_key: &ItemKey) -> u64 {
        self.item_popularity.get(item_key).copied().unwrap_or(0)
    }

    /// Items a user liked, in first-like order
    pub fn user_likes(&self, user_id: UserId) -> &[ItemKey] {
        self.user_likes
            .get(&user_id)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// Users who liked an item, in first-like order
    pub fn item_liked_by(&self, item_key: &ItemKey) -> &[UserId] {
        self.item_liked_by
            .get(item_key)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    pub fn user_count(&self) -> usize {
        self.user_likes.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_popularity.len()
    }

    /// Number of admitted positive events
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// Items by popularity descending; ties keep first-seen order
    pub fn items_by_popularity(&self) -> Vec<(&ItemKey, u64)> {
        let mut ranked: Vec<(&ItemKey, u64)> = self
            .item_order
            .iter()
            .map(|key| (key, self.popularity(key)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Two-hop collaborative expansion from a set of liked items.
    ///
    /// Returned pairs are sorted by accumulated score, highest first, with
    /// ties in first-reached order. Liked items never appear in the output.
    #[instrument(skip(self, liked_item_keys), fields(liked = liked_item_keys.len()))]
    pub fn get_collaborative_candidates(
        &self,
        liked_item_keys: &[ItemKey],
        limit: usize,
        max_users_per_item: usize,
        max_likes_per_user: usize,
    ) -> Vec<(ItemKey, f32)> {
        let liked: HashSet<&ItemKey> = liked_item_keys.iter().collect();
        let mut visited_liked: HashSet<&ItemKey> = HashSet::with_capacity(liked.len());

        let mut scores: Vec<(&ItemKey, f32)> = Vec::new();
        let mut slots: HashMap<&ItemKey, usize> = HashMap::new();

        for item in liked_item_keys {
            if !visited_liked.insert(item) {
                continue;
            }
            for &user_id in self.item_liked_by(item).iter().take(max_users_per_item) {
                let user_items = self.user_likes(user_id);
                let user_weight = dampening(user_items.len());

                for candidate in user_items.iter().take(max_likes_per_user) {
                    if liked.contains(candidate) {
                        continue;
                    }
                    let item_weight = dampening(self.popularity(candidate) as usize);
                    let contribution = user_weight * item_weight;

                    match slots.get(candidate) {
                        Some(&slot) => scores[slot].1 += contribution,
                        None => {
                            slots.insert(candidate, scores.len());
                            scores.push((candidate, contribution));
                        }
                    }
                }
            }
        }

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(limit);

        debug!("Generated {} collaborative candidates", scores.len());
        scores
            .into_iter()
            .map(|(key, score)| (key.clone(), score))
            .collect()
    }
}
