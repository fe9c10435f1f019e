//! Types shared by the ranking stages.

use catalog::{ItemId, ItemType};
use retrieval::{CandidateSource, DocId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const REASON_CONTENT: &str = "similar to items you liked";
pub const REASON_COLLABORATIVE: &str = "liked by people with similar taste";
pub const REASON_HYBRID: &str = "similar content and liked by people with similar taste";
pub const REASON_POPULAR: &str = "popular choice";
pub const REASON_DISCOVER: &str = "discover something new";

/// A candidate after hybrid scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub doc_id: DocId,
    pub item_type: ItemType,
    pub source: CandidateSource,
    /// Cosine against the user profile, in `[0, 1]`
    pub content_score: f32,
    /// `cf_raw / (1 + cf_raw)`, in `[0, 1)`
    pub cf_score: f32,
    /// Hybrid relevance used for thresholding, pooling and MMR
    pub score: f32,
}

impl ScoredCandidate {
    pub fn reason(&self) -> &'static str {
        match (self.content_score > 0.0, self.cf_score > 0.0) {
            (true, true) => REASON_HYBRID,
            (false, true) => REASON_COLLABORATIVE,
            _ => REASON_CONTENT,
        }
    }
}

/// Per-request inputs the filters look at
#[derive(Debug, Clone, Default)]
pub struct RankingContext {
    pub liked: HashSet<DocId>,
    pub target_type: Option<ItemType>,
    pub min_score: f32,
}

impl RankingContext {
    pub fn new(liked: impl IntoIterator<Item = DocId>) -> Self {
        Self {
            liked: liked.into_iter().collect(),
            target_type: None,
            min_score: 0.0,
        }
    }

    pub fn with_target_type(mut self, target_type: Option<ItemType>) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

/// Final ranked item returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub genres: Vec<String>,
    pub score: f32,
    pub reason: String,
}
