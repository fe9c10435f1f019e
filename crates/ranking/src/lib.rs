//! Ranking stages that turn candidates into recommendations.
//!
//! This crate provides:
//! - HybridScorer blending content cosine with collaborative signal
//! - Filter trait, implementations and FilterPipeline for thresholding
//! - MmrDiversifier for relevance/novelty reranking
//! - FallbackRanker for popularity and discovery fill
//!
//! ## Architecture
//! A recommend request moves through:
//! 1. HybridScorer assigns one score per candidate
//! 2. FilterPipeline drops liked items, other item types and low scores
//! 3. The top `mmr_pool` survivors are reranked by MmrDiversifier
//! 4. FallbackRanker pads the result when it is short
//!
//! ## Example Usage
//! ```ignore
//! use ranking::{FallbackRanker, FilterPipeline, HybridScorer, MmrDiversifier, RankingContext};
//!
//! let scored = HybridScorer::new().score(&index, &candidates, &content_scores);
//! let kept = FilterPipeline::standard().apply(scored, &context)?;
//! let picked = MmrDiversifier::new(0.3).rerank(&kept[..pool], &index, limit);
//! let padding = FallbackRanker::new().rank(&index, &graph, None, limit - picked.len(), &chosen);
//! ```

pub mod fallback;
pub mod filter_pipeline;
pub mod filters;
pub mod hybrid;
pub mod mmr;
pub mod traits;
pub mod types;

// Re-export main types
pub use fallback::{DISCOVER_SCORE, FallbackRanker, POPULAR_SCORE};
pub use filter_pipeline::FilterPipeline;
pub use hybrid::{COLLABORATIVE_WEIGHT, CONTENT_WEIGHT, HybridScorer};
pub use mmr::MmrDiversifier;
pub use traits::Filter;
pub use types::{
    REASON_COLLABORATIVE, REASON_CONTENT, REASON_DISCOVER, REASON_HYBRID, REASON_POPULAR, RankingContext,
    Recommendation, ScoredCandidate,
};

use retrieval::Document;

/// Build the response entry for a personalized candidate
pub fn recommendation_for(doc: &Document, scored: &ScoredCandidate) -> Recommendation {
    fallback::to_recommendation(doc, scored.score, scored.reason())
}
