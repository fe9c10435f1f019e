//! Ephemeral per-request user profile.
//!
//! A profile is the term-by-term *sum* of the liked documents' TF-IDF
//! vectors. It is not averaged: liking several items with the same genre or
//! title words makes those terms weigh proportionally more.

use std::collections::BTreeMap;

use crate::content_index::{ContentIndex, DocId, TermId};
use crate::interaction_graph::OrderedSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    /// Liked documents that contributed, deduplicated, request order
    pub liked: Vec<DocId>,
    /// Summed weights sorted by term id
    pub weights: Vec<(TermId, f32)>,
    pub norm: f32,
    /// Union of the liked documents' title unigrams and bigrams
    pub title_terms: Vec<TermId>,
    /// Union of the liked documents' genres
    pub genres: Vec<TermId>,
}

impl UserProfile {
    pub fn is_zero(&self) -> bool {
        self.norm == 0.0
    }
}

impl ContentIndex {
    /// Build a profile from liked doc ids. Unknown ids are skipped. A doc
    /// liked more than once adds its vector once per occurrence but appears
    /// once in `liked`.
    pub fn build_user_profile(&self, liked_doc_ids: &[DocId]) -> UserProfile {
        let mut summed: BTreeMap<TermId, f32> = BTreeMap::new();
        let mut liked = OrderedSet::default();
        let mut title_terms = OrderedSet::default();
        let mut genres = OrderedSet::default();

        for &doc_id in liked_doc_ids {
            let Some(document) = self.document(doc_id) else {
                continue;
            };
            for &(term, weight) in &document.vector {
                *summed.entry(term).or_insert(0.0) += weight;
            }
            if !liked.insert(doc_id) {
                continue;
            }
            for &term in &document.title_terms {
                title_terms.insert(term);
            }
            for &genre in &document.genre_terms {
                genres.insert(genre);
            }
        }

        let weights: Vec<(TermId, f32)> = summed.into_iter().filter(|&(_, w)| w != 0.0).collect();
        let norm = weights.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
        UserProfile {
            liked: liked.into_vec(),
            weights,
            norm,
            title_terms: title_terms.into_vec(),
            genres: genres.into_vec(),
        }
    }

    /// Cosine of the profile against each candidate (see
    /// [`ContentIndex::score_candidates_content`])
    pub fn score_profile(&self, profile: &UserProfile, candidates: &[DocId]) -> Vec<f32> {
        self.score_candidates_content(&profile.weights, profile.norm, candidates)
    }
}
