//! Engine configuration and per-request parameters.
//!
//! Config files are JSON; every field is optional and falls back to its
//! default:
//!
//! ```json
//! {
//!   "genre_expansion_top_k": 2,
//!   "max_users_per_item": 50,
//!   "max_likes_per_user": 50,
//!   "cf_candidate_limit": 200,
//!   "retention_min_timestamp": null,
//!   "defaults": { "limit": 10, "diversity": 0.3, "max_candidates": 500, "mmr_pool": 50, "min_score": 0.0 }
//! }
//! ```

use std::fs;
use std::path::Path;

use catalog::{ItemRef, ItemType, UserId};
use retrieval::CandidateGenerator;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const MAX_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Co-occurring genres added per liked genre
    pub genre_expansion_top_k: usize,
    pub max_users_per_item: usize,
    pub max_likes_per_user: usize,
    pub cf_candidate_limit: usize,
    /// Drop positive events older than this timestamp; `None` keeps everything
    pub retention_min_timestamp: Option<i64>,
    pub defaults: RecommendDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            genre_expansion_top_k: 2,
            max_users_per_item: 50,
            max_likes_per_user: 50,
            cf_candidate_limit: 200,
            retention_min_timestamp: None,
            defaults: RecommendDefaults::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_error = |reason: String| EngineError::Config {
            path: path.display().to_string(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| config_error(e.to_string()))
    }

    pub fn with_genre_expansion_top_k(mut self, top_k: usize) -> Self {
        self.genre_expansion_top_k = top_k;
        self
    }

    pub fn with_max_users_per_item(mut self, max: usize) -> Self {
        self.max_users_per_item = max;
        self
    }

    pub fn with_max_likes_per_user(mut self, max: usize) -> Self {
        self.max_likes_per_user = max;
        self
    }

    pub fn with_cf_candidate_limit(mut self, limit: usize) -> Self {
        self.cf_candidate_limit = limit;
        self
    }

    pub fn with_retention_min_timestamp(mut self, ts: Option<i64>) -> Self {
        self.retention_min_timestamp = ts;
        self
    }

    pub fn with_defaults(mut self, defaults: RecommendDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn candidate_generator(&self) -> CandidateGenerator {
        CandidateGenerator::new()
            .with_genre_expansion_top_k(self.genre_expansion_top_k)
            .with_max_users_per_item(self.max_users_per_item)
            .with_max_likes_per_user(self.max_likes_per_user)
            .with_cf_candidate_limit(self.cf_candidate_limit)
    }
}

/// Values used for request parameters the caller leaves out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendDefaults {
    pub limit: usize,
    pub diversity: f32,
    pub max_candidates: usize,
    pub mmr_pool: usize,
    pub min_score: f32,
}

impl Default for RecommendDefaults {
    fn default() -> Self {
        Self {
            limit: 10,
            diversity: 0.3,
            max_candidates: 500,
            mmr_pool: 50,
            min_score: 0.0,
        }
    }
}

/// Parameters of one recommend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub liked_items: Vec<ItemRef>,
    #[serde(default)]
    pub target_type: Option<ItemType>,
    pub limit: usize,
    pub diversity: f32,
    pub max_candidates: usize,
    pub mmr_pool: usize,
    pub min_score: f32,
}

impl RecommendRequest {
    pub fn new(liked_items: Vec<ItemRef>) -> Self {
        Self::with_defaults(liked_items, &RecommendDefaults::default())
    }

    pub fn with_defaults(liked_items: Vec<ItemRef>, defaults: &RecommendDefaults) -> Self {
        Self {
            user_id: None,
            liked_items,
            target_type: None,
            limit: defaults.limit,
            diversity: defaults.diversity,
            max_candidates: defaults.max_candidates,
            mmr_pool: defaults.mmr_pool,
            min_score: defaults.min_score,
        }
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn target_type(mut self, target_type: ItemType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn diversity(mut self, diversity: f32) -> Self {
        self.diversity = diversity;
        self
    }

    pub fn max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn mmr_pool(mut self, mmr_pool: usize) -> Self {
        self.mmr_pool = mmr_pool;
        self
    }

    pub fn min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Reject parameters outside their declared ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(EngineError::validation(
                "limit",
                format!("{} is outside [1, {}]", self.limit, MAX_LIMIT),
            ));
        }
        check_unit_interval("diversity", self.diversity)?;
        check_unit_interval("min_score", self.min_score)?;
        if self.max_candidates == 0 {
            return Err(EngineError::validation("max_candidates", "must be at least 1"));
        }
        if self.mmr_pool == 0 {
            return Err(EngineError::validation("mmr_pool", "must be at least 1"));
        }
        Ok(())
    }
}

fn check_unit_interval(field: &'static str, value: f32) -> Result<()> {
    // NaN fails the range check too
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::validation(field, format!("{value} is outside [0, 1]")))
    }
}
