//! Candidate Generator - bounded candidate set for one request.
//!
//! Two sources run side by side with `rayon::join`:
//! - **Content**: genre buckets for the profile's (expanded) genres, then
//!   postings of its title terms, capped at `max_candidates`
//! - **Collaborative**: two-hop expansion over the interaction graph, capped
//!   at `cf_candidate_limit`
//!
//! The union is returned sorted by doc id, with the liked documents removed
//! and each candidate's raw collaborative score attached.

use catalog::ItemKey;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::content_index::{ContentIndex, DocId};
use crate::interaction_graph::InteractionGraph;
use crate::profile::UserProfile;

/// Where a candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    Content,
    Collaborative,
    Both,
}

/// A document that will be scored
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub doc_id: DocId,
    pub source: CandidateSource,
    /// Accumulated collaborative score, 0 when the graph did not reach it
    pub cf_raw: f32,
}

impl Candidate {
    pub fn new(doc_id: DocId, source: CandidateSource, cf_raw: f32) -> Self {
        Self {
            doc_id,
            source,
            cf_raw,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    genre_expansion_top_k: usize,
    max_users_per_item: usize,
    max_likes_per_user: usize,
    cf_candidate_limit: usize,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateGenerator {
    pub fn new() -> Self {
        Self {
            genre_expansion_top_k: 2,
            max_users_per_item: 50,
            max_likes_per_user: 50,
            cf_candidate_limit: 200,
        }
    }

    /// Co-occurring genres added per liked genre (default: 2)
    pub fn with_genre_expansion_top_k(mut self, top_k: usize) -> Self {
        self.genre_expansion_top_k = top_k;
        self
    }

    /// Likers expanded per liked item (default: 50)
    pub fn with_max_users_per_item(mut self, max: usize) -> Self {
        self.max_users_per_item = max;
        self
    }

    /// Items taken per expanded liker (default: 50)
    pub fn with_max_likes_per_user(mut self, max: usize) -> Self {
        self.max_likes_per_user = max;
        self
    }

    /// Collaborative candidates kept (default: 200)
    pub fn with_cf_candidate_limit(mut self, limit: usize) -> Self {
        self.cf_candidate_limit = limit;
        self
    }

    /// Generate candidates for a profile against one index snapshot
    #[instrument(skip(self, index, graph, profile), fields(liked = profile.liked.len()))]
    pub fn generate(
        &self,
        index: &ContentIndex,
        graph: &InteractionGraph,
        profile: &UserProfile,
        max_candidates: usize,
    ) -> Vec<Candidate> {
        let liked_keys: Vec<ItemKey> = profile
            .liked
            .iter()
            .filter_map(|&doc_id| index.document(doc_id).map(|d| d.key.clone()))
            .collect();

        let (content_docs, cf_scores) = rayon::join(
            || {
                let genres = index.expand_genres(&profile.genres, self.genre_expansion_top_k);
                index.collect_candidates(&profile.title_terms, &genres, max_candidates)
            },
            || {
                graph.get_collaborative_candidates(
                    &liked_keys,
                    self.cf_candidate_limit,
                    self.max_users_per_item,
                    self.max_likes_per_user,
                )
            },
        );
        debug!(
            "Content candidates: {}, collaborative candidates: {}",
            content_docs.len(),
            cf_scores.len()
        );

        let mut merged: HashMap<DocId, Candidate> = HashMap::with_capacity(content_docs.len() + cf_scores.len());
        for doc_id in content_docs {
            merged.insert(doc_id, Candidate::new(doc_id, CandidateSource::Content, 0.0));
        }
        for (key, score) in cf_scores {
            // the graph can outlive items dropped by a full corpus replace
            let Some(doc_id) = index.doc_id(&key) else {
                continue;
            };
            merged
                .entry(doc_id)
                .and_modify(|c| {
                    c.source = CandidateSource::Both;
                    c.cf_raw = score;
                })
                .or_insert_with(|| Candidate::new(doc_id, CandidateSource::Collaborative, score));
        }
        for doc_id in &profile.liked {
            merged.remove(doc_id);
        }

        let mut candidates: Vec<Candidate> = merged.into_values().collect();
        candidates.sort_unstable_by_key(|c| c.doc_id);
        debug!("Generated {} merged candidates", candidates.len());
        candidates
    }
}
