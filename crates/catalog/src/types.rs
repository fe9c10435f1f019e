//! Core domain types for the recommendation catalog.
//!
//! This module defines the records that flow in from the external sync feed:
//! - Catalog items (movies, books, series) and their composite key
//! - Interaction events (likes, purchases, views)
//!
//! Everything downstream (index, graph, ranking) refers to items through
//! [`ItemKey`], the normalized `"type:id"` string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

// =============================================================================
// Type Aliases
// =============================================================================

/// External identifier of an item, unique only together with its [`ItemType`]
pub type ItemId = i64;

/// External identifier of a user
pub type UserId = i64;

// =============================================================================
// Item-related Types
// =============================================================================

/// Kind of catalog item. Part of the item's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Movie,
    Book,
    Series,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Movie => "movie",
            ItemType::Book => "book",
            ItemType::Series => "series",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(ItemType::Movie),
            "book" => Ok(ItemType::Book),
            "series" => Ok(ItemType::Series),
            _ => Err(CatalogError::InvalidValue {
                field: "type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Normalized item key of the form `"type:id"`, e.g. `"movie:10"`.
///
/// Two records with equal keys are the same item; the later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(item_type: ItemType, id: ItemId) -> Self {
        Self(format!("{}:{}", item_type.as_str(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ItemRef>().map(|item| item.key())
    }
}

/// A catalog item as delivered by the sync feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    /// Ordered set of genre tags (see [`ItemRecord::normalized`])
    #[serde(default)]
    pub genres: Vec<String>,
}

impl ItemRecord {
    pub fn new(id: ItemId, item_type: ItemType, title: impl Into<String>, genres: &[&str]) -> Self {
        Self {
            id,
            item_type,
            title: title.into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_type, self.id)
    }

    /// Trims genre tags, drops empty ones and removes duplicates while
    /// keeping the first occurrence.
    pub fn normalized(mut self) -> Self {
        let mut seen: Vec<String> = Vec::with_capacity(self.genres.len());
        for genre in self.genres.drain(..) {
            let genre = genre.trim();
            if genre.is_empty() || seen.iter().any(|g| g == genre) {
                continue;
            }
            seen.push(genre.to_string());
        }
        self.genres = seen;
        self
    }
}

/// Reference to an item without its content, as used in liked-item lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

impl ItemRef {
    pub fn new(id: ItemId, item_type: ItemType) -> Self {
        Self { id, item_type }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_type, self.id)
    }
}

impl FromStr for ItemRef {
    type Err = CatalogError;

    /// Parses `"type:id"` (used by the CLI `--like movie:10` flags)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or_else(|| CatalogError::InvalidValue {
            field: "item key".to_string(),
            value: s.to_string(),
        })?;
        let item_type: ItemType = kind.parse()?;
        let id: ItemId = id.trim().parse().map_err(|_| CatalogError::InvalidValue {
            field: "item id".to_string(),
            value: id.to_string(),
        })?;
        Ok(ItemRef::new(id, item_type))
    }
}

// =============================================================================
// Interaction Types
// =============================================================================

/// User interaction event kind.
///
/// Only `Like` and `Purchase` carry collaborative signal. Unrecognized event
/// names deserialize to `Other` so a feed is never rejected for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionEvent {
    Like,
    Purchase,
    View,
    #[serde(other)]
    Other,
}

impl InteractionEvent {
    /// Whether this event mutates the interaction graph
    pub fn is_positive(&self) -> bool {
        matches!(self, InteractionEvent::Like | InteractionEvent::Purchase)
    }
}

impl FromStr for InteractionEvent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "like" => InteractionEvent::Like,
            "purchase" => InteractionEvent::Purchase,
            "view" => InteractionEvent::View,
            _ => InteractionEvent::Other,
        })
    }
}

/// One interaction from the sync feed or a feedback call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub event: InteractionEvent,
    /// Unix timestamp, if the feed provides one
    #[serde(default)]
    pub ts: Option<i64>,
}

impl Interaction {
    pub fn new(user_id: UserId, item_id: ItemId, item_type: ItemType, event: InteractionEvent) -> Self {
        Self {
            user_id,
            item_id,
            item_type,
            event,
            ts: None,
        }
    }

    pub fn with_ts(mut self, ts: i64) -> Self {
        self.ts = Some(ts);
        self
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_type, self.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_format() {
        let key = ItemKey::new(ItemType::Movie, 10);
        assert_eq!(key.as_str(), "movie:10");
        assert_eq!(key.to_string(), "movie:10");
    }

    #[test]
    fn test_item_key_parse() {
        let key: ItemKey = "book:51".parse().unwrap();
        assert_eq!(key, ItemKey::new(ItemType::Book, 51));

        assert!("concert:1".parse::<ItemKey>().is_err());
        assert!("movie:abc".parse::<ItemKey>().is_err());
        assert!("movie".parse::<ItemKey>().is_err());

        let item: ItemRef = " Series: 7".parse().unwrap();
        assert_eq!(item, ItemRef::new(7, ItemType::Series));
    }

    #[test]
    fn test_same_id_different_type_are_distinct() {
        assert_ne!(ItemKey::new(ItemType::Movie, 1), ItemKey::new(ItemType::Book, 1));
    }

    #[test]
    fn test_normalized_genres() {
        let record = ItemRecord::new(1, ItemType::Movie, "Matrix", &["Action", " Sci-Fi ", "Action", ""]);
        let record = record.normalized();
        assert_eq!(record.genres, vec!["Action".to_string(), "Sci-Fi".to_string()]);
    }

    #[test]
    fn test_item_record_deserialize() {
        let json = r#"{"id": 10, "type": "movie", "title": "Szybcy i Wściekli", "genres": ["Action", "Crime"]}"#;
        let record: ItemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.item_type, ItemType::Movie);
        assert_eq!(record.key().as_str(), "movie:10");
        assert_eq!(record.genres.len(), 2);
    }

    #[test]
    fn test_unknown_event_deserializes_to_other() {
        let json = r#"{"user_id": 1, "item_id": 2, "item_type": "book", "event": "dislike"}"#;
        let interaction: Interaction = serde_json::from_str(json).unwrap();
        assert_eq!(interaction.event, InteractionEvent::Other);
        assert!(!interaction.event.is_positive());
        assert_eq!(interaction.ts, None);
    }

    #[test]
    fn test_positive_events() {
        assert!(InteractionEvent::Like.is_positive());
        assert!(InteractionEvent::Purchase.is_positive());
        assert!(!InteractionEvent::View.is_positive());
        assert_eq!("PURCHASE".parse::<InteractionEvent>().unwrap(), InteractionEvent::Purchase);
    }
}
