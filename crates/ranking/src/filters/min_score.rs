//! Threshold filter on the hybrid score.
//!
//! Drops every candidate with `score < min_score`. The threshold is
//! inclusive: a candidate exactly at `min_score` survives. Candidates with
//! no positive relevance are dropped whatever the threshold, so they are
//! left to the fallback ranker instead of being ranked as personalized.

use crate::traits::Filter;
use crate::types::{RankingContext, ScoredCandidate};
use anyhow::Result;

pub struct MinScoreFilter;

impl Filter for MinScoreFilter {
    fn name(&self) -> &str {
        "MinScoreFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredCandidate>,
        context: &RankingContext,
    ) -> Result<Vec<ScoredCandidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.score > 0.0 && candidate.score >= context.min_score)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ItemType;
    use retrieval::CandidateSource;

    fn scored(doc_id: u32, score: f32) -> ScoredCandidate {
        ScoredCandidate {
            doc_id,
            item_type: ItemType::Book,
            source: CandidateSource::Content,
            content_score: score,
            cf_score: 0.0,
            score,
        }
    }

    #[test]
    fn test_min_score_filter() {
        let context = RankingContext::default().with_min_score(0.5);
        let candidates = vec![scored(1, 0.49), scored(2, 0.5), scored(3, 0.9)];

        let filtered = MinScoreFilter.apply(candidates, &context).unwrap();
        let ids: Vec<u32> = filtered.iter().map(|c| c.doc_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_zero_score_never_survives() {
        let context = RankingContext::default();
        let candidates = vec![scored(1, 0.0), scored(2, 0.1), scored(3, 0.001)];
        let filtered = MinScoreFilter.apply(candidates, &context).unwrap();
        let ids: Vec<u32> = filtered.iter().map(|c| c.doc_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
