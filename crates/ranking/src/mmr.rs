//! MMR Diversifier - Maximal Marginal Relevance reranking.
//!
//! Greedy selection over a fixed pool:
//!
//! ```text
//! mmr(c) = lambda * relevance(c) - (1 - lambda) * max_{s in selected} sim(c, s)
//! lambda = 1 - diversity
//! ```
//!
//! Similarity is the content cosine between documents. The pool is never
//! mutated: picks are tracked with a boolean mask and each candidate's
//! maximum similarity to the selection is updated once per pick, so a run
//! costs `O(pool * limit)` similarity calls. Ties go to the earlier pool
//! position.

use retrieval::{ContentIndex, DocId};
use tracing::debug;

use crate::types::ScoredCandidate;

#[derive(Debug, Clone, Copy)]
pub struct MmrDiversifier {
    lambda: f32,
}

impl MmrDiversifier {
    /// `diversity` in `[0, 1]`; 0 is pure relevance order
    pub fn new(diversity: f32) -> Self {
        Self {
            lambda: 1.0 - diversity.clamp(0.0, 1.0),
        }
    }

    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    /// Rerank `pool` (sorted by score, highest first) using content cosine
    pub fn rerank(
        &self,
        pool: &[ScoredCandidate],
        index: &ContentIndex,
        limit: usize,
    ) -> Vec<ScoredCandidate> {
        self.rerank_with(pool, limit, |a, b| index.cosine(a, b))
    }

    /// Rerank with an arbitrary document similarity
    pub fn rerank_with<F>(&self, pool: &[ScoredCandidate], limit: usize, similarity: F) -> Vec<ScoredCandidate>
    where
        F: Fn(DocId, DocId) -> f32,
    {
        let target = limit.min(pool.len());
        let mut picked = vec![false; pool.len()];
        let mut max_similarity = vec![0.0f32; pool.len()];
        let mut selected: Vec<ScoredCandidate> = Vec::with_capacity(target);

        while selected.len() < target {
            let mut best: Option<(usize, f32)> = None;
            for (idx, candidate) in pool.iter().enumerate() {
                if picked[idx] {
                    continue;
                }
                let mmr = self.lambda * candidate.score - (1.0 - self.lambda) * max_similarity[idx];
                if best.is_none_or(|(_, best_mmr)| mmr > best_mmr) {
                    best = Some((idx, mmr));
                }
            }

            let Some((chosen, _)) = best else {
                break;
            };
            picked[chosen] = true;
            let chosen_doc = pool[chosen].doc_id;
            selected.push(pool[chosen].clone());

            for (idx, candidate) in pool.iter().enumerate() {
                if !picked[idx] {
                    let sim = similarity(candidate.doc_id, chosen_doc);
                    if sim > max_similarity[idx] {
                        max_similarity[idx] = sim;
                    }
                }
            }
        }

        debug!("MMR selected {} of {} pooled candidates", selected.len(), pool.len());
        selected
    }
}
