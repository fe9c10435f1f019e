//! # Recommendation Service
//!
//! Owns the shared state and runs the operations callers see:
//! - `sync_items` / `rebuild`: corpus changes and index rebuilds
//! - `sync_interactions` / `feedback`: interaction ingestion
//! - `recommend`: the ranked response for one request
//! - `health` / `stats` / `search`: read-only introspection
//!
//! ## Shared state
//!
//! The active index is an `Arc<ContentIndex>` behind a lock that is only held
//! long enough to clone or swap the pointer. A rebuild builds the new index
//! off to the side and publishes it in one step, so a recommend request runs
//! to completion against the snapshot it started with. The corpus write lock
//! is held across a rebuild so concurrent syncs serialize. The interaction
//! graph is read-locked by recommend and write-locked by ingestion.
//!
//! ## Recommend stages
//! 1. Resolve liked items against the snapshot (unknown ones are dropped)
//! 2. Build the user profile and generate candidates
//! 3. Hybrid-score, then filter (liked, target type, min score)
//! 4. Keep the top `mmr_pool` and rerank with MMR
//! 5. Pad with the fallback ranker when short

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use catalog::{Corpus, Interaction, ItemKey, ItemRecord, ItemType};
use ranking::{
    FallbackRanker, FilterPipeline, HybridScorer, MmrDiversifier, RankingContext, Recommendation, ScoredCandidate,
    recommendation_for,
};
use retrieval::{CandidateGenerator, ContentIndex, DocId, InteractionGraph, MinTimestamp, TermId, tokenizer};

use crate::config::{EngineConfig, RecommendRequest};
use crate::error::{EngineError, Result};

const NO_INDEX: &str = "no index has been built; sync items first";

/// Returned by `sync_items` and `rebuild`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub item_count: usize,
    pub index_ready: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInteractionsReport {
    /// Positive events recorded in the graph
    pub ingested: usize,
    /// Events whose item is not in the index
    pub skipped_unknown: usize,
    /// Non-positive events, or events refused by the retention policy
    pub ignored: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub index_ready: bool,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub item_count: usize,
    pub vocabulary_size: usize,
    pub genre_count: usize,
    pub user_count: usize,
    pub interacted_item_count: usize,
    pub interaction_total: u64,
    pub index_ready: bool,
}

/// One title search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub genres: Vec<String>,
    pub score: f32,
}

pub struct RecommendationService {
    config: EngineConfig,
    generator: CandidateGenerator,
    filters: FilterPipeline,
    corpus: RwLock<Corpus>,
    index: RwLock<Option<Arc<ContentIndex>>>,
    graph: RwLock<InteractionGraph>,
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RecommendationService {
    pub fn new(config: EngineConfig) -> Self {
        let graph = match config.retention_min_timestamp {
            Some(ts) => InteractionGraph::new().with_retention(MinTimestamp(ts)),
            None => InteractionGraph::new(),
        };
        info!("Interaction retention policy: {}", graph.retention_policy());

        Self {
            generator: config.candidate_generator(),
            filters: FilterPipeline::standard(),
            config,
            corpus: RwLock::new(Corpus::new()),
            index: RwLock::new(None),
            graph: RwLock::new(graph),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The currently published index, if any
    pub fn snapshot(&self) -> Option<Arc<ContentIndex>> {
        self.index.read().clone()
    }

    fn require_snapshot(&self) -> Result<Arc<ContentIndex>> {
        self.snapshot().ok_or(EngineError::PreconditionFailed(NO_INDEX))
    }

    // ========================================================================
    // Corpus
    // ========================================================================

    /// Replace or upsert items, then rebuild and publish the index
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn sync_items(&self, items: Vec<ItemRecord>, full_replace: bool) -> IndexReport {
        let mut corpus = self.corpus.write();
        if full_replace {
            corpus.replace_all(items);
        } else {
            let added = corpus.upsert_many(items);
            debug!("Upserted items, {} new", added);
        }
        self.publish(&corpus)
    }

    /// Rebuild the index from the current corpus
    #[instrument(skip(self))]
    pub fn rebuild(&self) -> IndexReport {
        let corpus = self.corpus.read();
        self.publish(&corpus)
    }

    fn publish(&self, corpus: &Corpus) -> IndexReport {
        let start = Instant::now();
        let index = Arc::new(ContentIndex::rebuild(corpus));
        info!(
            "Rebuilt index: {} items, {} terms, {} genres in {:.2?}",
            index.num_docs(),
            index.vocabulary_size(),
            index.genre_count(),
            start.elapsed()
        );
        *self.index.write() = Some(index);
        IndexReport {
            item_count: corpus.len(),
            index_ready: true,
        }
    }

    // ========================================================================
    // Interactions
    // ========================================================================

    #[instrument(skip(self, interactions), fields(events = interactions.len()))]
    pub fn sync_interactions(&self, interactions: &[Interaction]) -> Result<SyncInteractionsReport> {
        let index = self.require_snapshot()?;
        let mut report = SyncInteractionsReport::default();
        let mut graph = self.graph.write();

        for interaction in interactions {
            if !index.contains_key(&interaction.key()) {
                report.skipped_unknown += 1;
            } else if graph.ingest(interaction) {
                report.ingested += 1;
            } else {
                report.ignored += 1;
            }
        }

        if report.skipped_unknown > 0 {
            warn!("Skipped {} interactions for unknown items", report.skipped_unknown);
        }
        info!(
            "Synced interactions: {} ingested, {} unknown, {} ignored",
            report.ingested, report.skipped_unknown, report.ignored
        );
        Ok(report)
    }

    /// Record one interaction and return the item's popularity afterwards
    #[instrument(skip(self, interaction), fields(user = interaction.user_id, item = %interaction.key()))]
    pub fn feedback(&self, interaction: &Interaction) -> Result<u64> {
        let index = self.require_snapshot()?;
        let key = interaction.key();
        if !index.contains_key(&key) {
            return Err(EngineError::NotFound { key: key.to_string() });
        }

        let mut graph = self.graph.write();
        if !graph.ingest(interaction) {
            debug!("Event {:?} not recorded", interaction.event);
        }
        Ok(graph.popularity(&key))
    }

    // ========================================================================
    // Recommend
    // ========================================================================

    #[instrument(
        skip(self, request),
        fields(user = ?request.user_id, liked = request.liked_items.len(), limit = request.limit)
    )]
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Vec<Recommendation>> {
        request.validate()?;
        let Some(index) = self.snapshot() else {
            debug!("No index published, returning empty result");
            return Ok(Vec::new());
        };
        let start = Instant::now();
        let graph = self.graph.read();

        let mut liked_docs: Vec<DocId> = Vec::with_capacity(request.liked_items.len());
        let mut liked_keys: HashSet<ItemKey> = HashSet::with_capacity(request.liked_items.len());
        for item in &request.liked_items {
            let key = item.key();
            if let Some(doc_id) = index.doc_id(&key) {
                liked_docs.push(doc_id);
                liked_keys.insert(key);
            }
        }
        let dropped = request.liked_items.len() - liked_docs.len();
        if dropped > 0 {
            debug!("Dropped {} unknown liked items", dropped);
        }

        let fallback = FallbackRanker::new();
        if liked_docs.is_empty() {
            debug!("No known liked items, using fallback ranking");
            return Ok(fallback.rank(&index, &graph, request.target_type, request.limit, &liked_keys));
        }

        let profile = index.build_user_profile(&liked_docs);
        let candidates = self
            .generator
            .generate(&index, &graph, &profile, request.max_candidates);
        let doc_ids: Vec<DocId> = candidates.iter().map(|c| c.doc_id).collect();
        let content_scores = index.score_profile(&profile, &doc_ids);
        let scored = HybridScorer::new().score(&index, &candidates, &content_scores);

        let context = RankingContext::new(profile.liked.iter().copied())
            .with_target_type(request.target_type)
            .with_min_score(request.min_score);
        let mut pool = self.filters.apply(scored, &context)?;
        let filtered = pool.len();
        pool.sort_by(rank_order);
        pool.truncate(request.mmr_pool);

        let picked = MmrDiversifier::new(request.diversity).rerank(&pool, &index, request.limit);
        let mut recommendations: Vec<Recommendation> = picked
            .iter()
            .filter_map(|candidate| {
                let doc = index.document(candidate.doc_id)?;
                liked_keys.insert(doc.key.clone());
                Some(recommendation_for(doc, candidate))
            })
            .collect();
        let personalized = recommendations.len();

        if recommendations.len() < request.limit {
            let padding = fallback.rank(
                &index,
                &graph,
                request.target_type,
                request.limit - recommendations.len(),
                &liked_keys,
            );
            recommendations.extend(padding);
        }

        debug!(
            "Candidates: {}, after filters: {}, pool: {}, personalized: {}, padded: {}",
            candidates.len(),
            filtered,
            pool.len(),
            personalized,
            recommendations.len() - personalized
        );
        info!(
            "Returned {} recommendations in {:.2?}",
            recommendations.len(),
            start.elapsed()
        );
        Ok(recommendations)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn health(&self) -> HealthReport {
        let item_count = self.corpus.read().len();
        let index_ready = self.index.read().is_some();
        let status = if index_ready && item_count > 0 { "ok" } else { "empty" };
        HealthReport {
            status: status.to_string(),
            index_ready,
            item_count,
        }
    }

    pub fn stats(&self) -> StatsReport {
        let item_count = self.corpus.read().len();
        let index = self.snapshot();
        let graph = self.graph.read();
        StatsReport {
            item_count,
            vocabulary_size: index.as_ref().map_or(0, |i| i.vocabulary_size()),
            genre_count: index.as_ref().map_or(0, |i| i.genre_count()),
            user_count: graph.user_count(),
            interacted_item_count: graph.item_count(),
            interaction_total: graph.total_events(),
            index_ready: index.is_some(),
        }
    }

    /// Title lookup through the index postings, best TF-IDF match first
    pub fn search(&self, title: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let index = self.require_snapshot()?;

        let mut weights: Vec<(TermId, f32)> = Vec::new();
        for term in tokenizer::title_terms(title) {
            let Some(term_id) = index.term_id(&term) else {
                continue;
            };
            match weights.iter_mut().find(|(id, _)| *id == term_id) {
                Some((_, w)) => *w += index.idf(term_id),
                None => weights.push((term_id, index.idf(term_id))),
            }
        }
        weights.sort_unstable_by_key(|&(id, _)| id);
        let norm = weights.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
        let terms: Vec<TermId> = weights.iter().map(|&(id, _)| id).collect();

        let doc_ids = index.collect_candidates(&terms, &[], index.num_docs());
        let scores = index.score_candidates_content(&weights, norm, &doc_ids);

        let mut hits: Vec<SearchHit> = doc_ids
            .iter()
            .zip(scores)
            .filter(|&(_, score)| score > 0.0)
            .filter_map(|(&doc_id, score)| {
                let record = &index.document(doc_id)?.record;
                Some(SearchHit {
                    id: record.id,
                    item_type: record.item_type,
                    title: record.title.clone(),
                    genres: record.genres.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Highest score first, ties by doc id
fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.doc_id.cmp(&b.doc_id))
}
