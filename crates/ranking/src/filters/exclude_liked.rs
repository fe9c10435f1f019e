//! Filter to remove items the user already liked.
//!
//! Candidate generation drops liked documents already; this filter keeps
//! the guarantee for candidate lists assembled any other way.

use crate::traits::Filter;
use crate::types::{RankingContext, ScoredCandidate};
use anyhow::Result;

/// Removes candidates whose doc id is in `RankingContext::liked`.
pub struct ExcludeLikedFilter;

impl Filter for ExcludeLikedFilter {
    fn name(&self) -> &str {
        "ExcludeLikedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredCandidate>,
        context: &RankingContext,
    ) -> Result<Vec<ScoredCandidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| !context.liked.contains(&candidate.doc_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ItemType;
    use retrieval::CandidateSource;

    #[test]
    fn test_exclude_liked_filter() {
        let context = RankingContext::new([100, 200]);
        let candidates: Vec<ScoredCandidate> = [100, 101, 200, 300]
            .into_iter()
            .map(|doc_id| ScoredCandidate {
                doc_id,
                item_type: ItemType::Movie,
                source: CandidateSource::Content,
                content_score: 0.5,
                cf_score: 0.0,
                score: 0.5,
            })
            .collect();

        let filtered = ExcludeLikedFilter.apply(candidates, &context).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].doc_id, 101);
        assert_eq!(filtered[1].doc_id, 300);
    }
}
