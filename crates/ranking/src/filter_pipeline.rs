//! The FilterPipeline chains filters over scored candidates.

use crate::traits::Filter;
use crate::filters::{ExcludeLikedFilter, MinScoreFilter, TargetTypeFilter};
use crate::types::{RankingContext, ScoredCandidate};
use anyhow::Result;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(ExcludeLikedFilter)
///     .add_filter(TargetTypeFilter)
///     .add_filter(MinScoreFilter);
///
/// let kept = pipeline.apply(scored, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The filters every recommend request runs: drop liked items, drop
    /// other item types, drop candidates under the score threshold.
    pub fn standard() -> Self {
        Self::new()
            .add_filter(ExcludeLikedFilter)
            .add_filter(TargetTypeFilter)
            .add_filter(MinScoreFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    pub fn apply(
        &self,
        candidates: Vec<ScoredCandidate>,
        context: &RankingContext,
    ) -> Result<Vec<ScoredCandidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter {} kept {} of {} candidates",
                filter.name(),
                current.len(),
                before
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
