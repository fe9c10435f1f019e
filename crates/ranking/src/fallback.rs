//! Fallback Ranker - non-personalized fill.
//!
//! Used when nothing the user liked is known, when scoring leaves no
//! candidates, or to pad a short personalized result. Two passes:
//! 1. graph items by popularity, highest first (`"popular choice"`, 0.1)
//! 2. the corpus in stored order (`"discover something new"`, 0.05)
//!
//! Keys in the exclusion set, and keys emitted by an earlier pass, are never
//! returned.

use catalog::{ItemKey, ItemType};
use retrieval::{ContentIndex, Document, InteractionGraph};
use std::collections::HashSet;
use tracing::debug;

use crate::types::{REASON_DISCOVER, REASON_POPULAR, Recommendation};

pub const POPULAR_SCORE: f32 = 0.1;
pub const DISCOVER_SCORE: f32 = 0.05;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRanker;

impl FallbackRanker {
    pub fn new() -> Self {
        Self
    }

    /// Produce up to `count` recommendations not in `exclude`
    pub fn rank(
        &self,
        index: &ContentIndex,
        graph: &InteractionGraph,
        target_type: Option<ItemType>,
        count: usize,
        exclude: &HashSet<ItemKey>,
    ) -> Vec<Recommendation> {
        let mut out = Vec::with_capacity(count);
        if count == 0 {
            return out;
        }
        let mut emitted: HashSet<&ItemKey> = HashSet::new();
        let admits = |doc: &Document| {
            !exclude.contains(&doc.key) && target_type.is_none_or(|t| doc.record.item_type == t)
        };

        for (key, _) in graph.items_by_popularity() {
            if out.len() >= count {
                break;
            }
            // popular items may have left the corpus on a full replace
            let Some(doc) = index.doc_id(key).and_then(|id| index.document(id)) else {
                continue;
            };
            if admits(doc) && emitted.insert(&doc.key) {
                out.push(to_recommendation(doc, POPULAR_SCORE, REASON_POPULAR));
            }
        }
        let popular = out.len();

        for doc in index.documents() {
            if out.len() >= count {
                break;
            }
            if admits(doc) && emitted.insert(&doc.key) {
                out.push(to_recommendation(doc, DISCOVER_SCORE, REASON_DISCOVER));
            }
        }

        debug!(
            "Fallback produced {} popular and {} discovery items",
            popular,
            out.len() - popular
        );
        out
    }
}

pub(crate) fn to_recommendation(doc: &Document, score: f32, reason: &str) -> Recommendation {
    Recommendation {
        id: doc.record.id,
        item_type: doc.record.item_type,
        title: doc.record.title.clone(),
        genres: doc.record.genres.clone(),
        score,
        reason: reason.to_string(),
    }
}
