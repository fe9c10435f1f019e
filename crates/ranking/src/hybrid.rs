//! Hybrid Scorer - blends content similarity with collaborative signal.
//!
//! ```text
//! cf_score = cf_raw / (1 + cf_raw)
//! score    = 0.45 * content + 0.55 * cf_score   if cf_score > 0
//!          = content                            otherwise
//! ```
//!
//! The weights are not renormalized when collaborative signal is missing, so
//! content-only and hybrid candidates live on different effective scales.

use catalog::ItemType;
use retrieval::{Candidate, ContentIndex};

use crate::types::ScoredCandidate;

pub const CONTENT_WEIGHT: f32 = 0.45;
pub const COLLABORATIVE_WEIGHT: f32 = 0.55;

#[derive(Debug, Clone, Copy, Default)]
pub struct HybridScorer;

impl HybridScorer {
    pub fn new() -> Self {
        Self
    }

    /// Map an unbounded raw collaborative score into `[0, 1)`
    pub fn normalize_collaborative(cf_raw: f32) -> f32 {
        if cf_raw > 0.0 {
            cf_raw / (1.0 + cf_raw)
        } else {
            0.0
        }
    }

    pub fn blend(content_score: f32, cf_score: f32) -> f32 {
        if cf_score > 0.0 {
            CONTENT_WEIGHT * content_score + COLLABORATIVE_WEIGHT * cf_score
        } else {
            content_score
        }
    }

    /// Score candidates; `content_scores` is aligned with `candidates`.
    ///
    /// Candidates whose doc id is not in `index` are dropped.
    pub fn score(
        &self,
        index: &ContentIndex,
        candidates: &[Candidate],
        content_scores: &[f32],
    ) -> Vec<ScoredCandidate> {
        candidates
            .iter()
            .zip(content_scores)
            .filter_map(|(candidate, &content_score)| {
                let item_type: ItemType = index.document(candidate.doc_id)?.record.item_type;
                let cf_score = Self::normalize_collaborative(candidate.cf_raw);
                Some(ScoredCandidate {
                    doc_id: candidate.doc_id,
                    item_type,
                    source: candidate.source,
                    content_score,
                    cf_score,
                    score: Self::blend(content_score, cf_score),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Corpus, ItemRecord};
    use retrieval::CandidateSource;

    #[test]
    fn test_normalize_collaborative() {
        assert_eq!(HybridScorer::normalize_collaborative(0.0), 0.0);
        assert_eq!(HybridScorer::normalize_collaborative(1.0), 0.5);
        assert!(HybridScorer::normalize_collaborative(1_000.0) < 1.0);
    }

    #[test]
    fn test_blend_with_collaborative_signal() {
        let score = HybridScorer::blend(0.8, 0.5);
        assert!((score - (0.45 * 0.8 + 0.55 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_blend_is_not_renormalized_without_signal() {
        // content-only keeps its full value
        assert_eq!(HybridScorer::blend(0.8, 0.0), 0.8);
        // while a tiny collaborative signal pulls the same content down
        assert!(HybridScorer::blend(0.8, 0.01) < 0.8);
    }

    #[test]
    fn test_score_candidates() {
        let corpus = Corpus::from_records(vec![
            ItemRecord::new(1, ItemType::Movie, "Matrix", &["Action"]),
            ItemRecord::new(2, ItemType::Book, "Dune", &["Sci-Fi"]),
        ]);
        let index = ContentIndex::rebuild(&corpus);
        let candidates = vec![
            Candidate::new(0, CandidateSource::Content, 0.0),
            Candidate::new(1, CandidateSource::Collaborative, 1.0),
            Candidate::new(99, CandidateSource::Content, 0.0),
        ];

        let scored = HybridScorer::new().score(&index, &candidates, &[0.6, 0.0, 0.9]);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].score, 0.6);
        assert_eq!(scored[1].item_type, ItemType::Book);
        assert!((scored[1].score - 0.55 * 0.5).abs() < 1e-6);
    }
}
