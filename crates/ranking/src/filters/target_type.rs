//! Filter to keep only the requested item type.

use crate::traits::Filter;
use crate::types::{RankingContext, ScoredCandidate};
use anyhow::Result;

/// Keeps candidates of `RankingContext::target_type`; a no-op when the
/// request has no target type.
pub struct TargetTypeFilter;

impl Filter for TargetTypeFilter {
    fn name(&self) -> &str {
        "TargetTypeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredCandidate>,
        context: &RankingContext,
    ) -> Result<Vec<ScoredCandidate>> {
        let Some(target) = context.target_type else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.item_type == target)
            .collect())
    }
}
