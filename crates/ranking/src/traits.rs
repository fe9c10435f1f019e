//! Core traits for the ranking pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters over scored candidates.

use anyhow::Result;

use crate::types::{RankingContext, ScoredCandidate};

/// Core trait for filtering scored candidates.
///
/// ## Design Note
/// - `Send + Sync` lets one pipeline serve concurrent requests
/// - Filters take ownership of the Vec and return the survivors in order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    fn apply(
        &self,
        candidates: Vec<ScoredCandidate>,
        context: &RankingContext,
    ) -> Result<Vec<ScoredCandidate>>;
}
