//! Content Index - sparse TF-IDF inverted index over titles and genres.
//!
//! One index generation is built from a full [`Corpus`] in a single pass and
//! never mutated afterwards. A new corpus means a new `ContentIndex`; doc ids
//! and term ids from an older generation are meaningless against it.
//!
//! ## Layout
//! - vocabulary: term text -> term id (first sight across the corpus)
//! - per-document sparse vector sorted by term id, plus its L2 norm
//! - postings: term id -> `(doc_id, weight)` sorted by doc id
//! - genre buckets: genre term -> doc ids (sorted)
//! - genre co-occurrence: genre term -> co-occurring genres, most frequent
//!   first, ties in first-seen order
//!
//! ## Weighting
//! `weight = (1 + ln(1 + tf)) * idf`, `idf = ln((N + 1) / (df + 1)) + 1`

use catalog::{Corpus, ItemKey, ItemRecord};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::interaction_graph::OrderedSet;
use crate::tokenizer;

/// Dense document id in `[0, N)`, valid for one index generation
pub type DocId = u32;

/// Vocabulary id, valid for one index generation
pub type TermId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32,
}

/// An indexed item
#[derive(Debug, Clone)]
pub struct Document {
    pub record: ItemRecord,
    pub key: ItemKey,
    /// Distinct title unigram and bigram terms, first-occurrence order
    pub title_terms: Vec<TermId>,
    /// Distinct genre terms, in the item's genre order
    pub genre_terms: Vec<TermId>,
    /// TF-IDF weights sorted by term id
    pub vector: Vec<(TermId, f32)>,
    pub norm: f32,
}

/// Term interning used only while building
#[derive(Default)]
struct Vocabulary {
    ids: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl Vocabulary {
    fn intern(&mut self, term: String) -> TermId {
        if let Some(&id) = self.ids.get(&term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.clone());
        self.ids.insert(term, id);
        id
    }
}

/// Per-genre co-occurrence counter that remembers insertion order
#[derive(Default)]
struct CooccurrenceCounter {
    counts: Vec<(TermId, u32)>,
    slots: HashMap<TermId, usize>,
}

impl CooccurrenceCounter {
    fn increment(&mut self, genre: TermId) {
        match self.slots.get(&genre) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.slots.insert(genre, self.counts.len());
                self.counts.push((genre, 1));
            }
        }
    }

    fn into_most_common(mut self) -> Vec<(TermId, u32)> {
        // stable: equal counts keep insertion order
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
    }
}

#[derive(Debug, Default)]
pub struct ContentIndex {
    vocabulary: HashMap<String, TermId>,
    terms: Vec<String>,
    doc_freq: Vec<u32>,
    idf: Vec<f32>,
    documents: Vec<Document>,
    doc_by_key: HashMap<ItemKey, DocId>,
    postings: Vec<Vec<Posting>>,
    genre_buckets: HashMap<TermId, Vec<DocId>>,
    genre_cooccurrence: HashMap<TermId, Vec<(TermId, u32)>>,
}

impl ContentIndex {
    /// An index with no documents
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fresh index generation from the corpus, in corpus order.
    ///
    /// Runs in time linear in the total number of title tokens and genre
    /// tags (plus a per-document sort of its distinct terms).
    #[instrument(skip(corpus), fields(items = corpus.len()))]
    pub fn rebuild(corpus: &Corpus) -> Self {
        let mut vocab = Vocabulary::default();
        let mut doc_freq: Vec<u32> = Vec::new();

        // Pass 1: term frequencies per document
        let mut frequencies: Vec<Vec<(TermId, u32)>> = Vec::with_capacity(corpus.len());
        let mut documents: Vec<Document> = Vec::with_capacity(corpus.len());

        for record in corpus.iter() {
            let mut tf: Vec<(TermId, u32)> = Vec::new();
            let mut slots: HashMap<TermId, usize> = HashMap::new();
            let mut title_terms = Vec::new();
            let mut genre_terms = Vec::new();

            for term in tokenizer::title_terms(&record.title) {
                let id = vocab.intern(term);
                match slots.get(&id) {
                    Some(&slot) => tf[slot].1 += 1,
                    None => {
                        slots.insert(id, tf.len());
                        tf.push((id, 1));
                        title_terms.push(id);
                    }
                }
            }

            for genre in &record.genres {
                let id = vocab.intern(tokenizer::genre_term(genre));
                if slots.contains_key(&id) {
                    continue;
                }
                slots.insert(id, tf.len());
                tf.push((id, 1));
                genre_terms.push(id);
            }

            if doc_freq.len() < vocab.terms.len() {
                doc_freq.resize(vocab.terms.len(), 0);
            }
            for &(id, _) in &tf {
                doc_freq[id as usize] += 1;
            }

            documents.push(Document {
                record: record.clone(),
                key: record.key(),
                title_terms,
                genre_terms,
                vector: Vec::new(),
                norm: 0.0,
            });
            frequencies.push(tf);
        }
        doc_freq.resize(vocab.terms.len(), 0);

        // Pass 2: idf, weights, norms, postings, genre structures
        let n = documents.len() as f32;
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| ((n + 1.0) / (df as f32 + 1.0)).ln() + 1.0)
            .collect();

        let mut postings: Vec<Vec<Posting>> = doc_freq
            .iter()
            .map(|&df| Vec::with_capacity(df as usize))
            .collect();
        let mut genre_buckets: HashMap<TermId, Vec<DocId>> = HashMap::new();
        let mut cooccurrence: HashMap<TermId, CooccurrenceCounter> = HashMap::new();
        let mut doc_by_key = HashMap::with_capacity(documents.len());

        for (doc_idx, (document, tf)) in documents.iter_mut().zip(frequencies).enumerate() {
            let doc_id = doc_idx as DocId;

            let mut vector: Vec<(TermId, f32)> = tf
                .into_iter()
                .map(|(id, count)| {
                    let weight = (1.0 + (1.0 + count as f32).ln()) * idf[id as usize];
                    (id, weight)
                })
                .collect();
            vector.sort_unstable_by_key(|&(id, _)| id);
            document.norm = vector.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();

            // doc ids are visited in ascending order, so postings stay sorted
            for &(id, weight) in &vector {
                postings[id as usize].push(Posting { doc_id, weight });
            }
            document.vector = vector;

            for &genre in &document.genre_terms {
                genre_buckets.entry(genre).or_default().push(doc_id);
            }
            for &a in &document.genre_terms {
                for &b in &document.genre_terms {
                    if a != b {
                        cooccurrence.entry(a).or_default().increment(b);
                    }
                }
            }

            doc_by_key.insert(document.key.clone(), doc_id);
        }

        let genre_cooccurrence = cooccurrence
            .into_iter()
            .map(|(genre, counter)| (genre, counter.into_most_common()))
            .collect();

        let index = Self {
            vocabulary: vocab.ids,
            terms: vocab.terms,
            doc_freq,
            idf,
            documents,
            doc_by_key,
            postings,
            genre_buckets,
            genre_cooccurrence,
        };
        debug!(
            "Built content index: {} documents, {} terms, {} genres",
            index.num_docs(),
            index.vocabulary_size(),
            index.genre_count()
        );
        index
    }

    // Getters

    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn genre_count(&self) -> usize {
        self.genre_buckets.len()
    }

    pub fn doc_id(&self, key: &ItemKey) -> Option<DocId> {
        self.doc_by_key.get(key).copied()
    }

    pub fn contains_key(&self, key: &ItemKey) -> bool {
        self.doc_by_key.contains_key(key)
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    /// Documents in doc id order, which is the corpus order they were built from
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.vocabulary.get(term).copied()
    }

    pub fn term(&self, term_id: TermId) -> Option<&str> {
        self.terms.get(term_id as usize).map(|s| s.as_str())
    }

    pub fn doc_freq(&self, term_id: TermId) -> u32 {
        self.doc_freq.get(term_id as usize).copied().unwrap_or(0)
    }

    pub fn idf(&self, term_id: TermId) -> f32 {
        self.idf.get(term_id as usize).copied().unwrap_or(0.0)
    }

    pub fn postings(&self, term_id: TermId) -> &[Posting] {
        self.postings
            .get(term_id as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn genre_bucket(&self, genre: TermId) -> &[DocId] {
        self.genre_buckets
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Co-occurring genres, most frequent first
    pub fn cooccurring_genres(&self, genre: TermId) -> &[(TermId, u32)] {
        self.genre_cooccurrence
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // Similarity and retrieval

    /// Cosine similarity of two documents in `[0, 1]`.
    ///
    /// Merge-joins the two term-sorted vectors; 0 when either norm is 0 or a
    /// doc id is out of range.
    pub fn cosine(&self, a: DocId, b: DocId) -> f32 {
        let (Some(doc_a), Some(doc_b)) = (self.document(a), self.document(b)) else {
            return 0.0;
        };
        if doc_a.norm == 0.0 || doc_b.norm == 0.0 {
            return 0.0;
        }

        let (va, vb) = (&doc_a.vector, &doc_b.vector);
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0f32;
        while i < va.len() && j < vb.len() {
            match va[i].0.cmp(&vb[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += va[i].1 * vb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        (dot / (doc_a.norm * doc_b.norm)).clamp(0.0, 1.0)
    }

    /// Add, for every base genre, its `top_k_per_genre` most frequent
    /// co-occurring genres. The result starts with `base_genres` (deduplicated)
    /// and is always a superset of it.
    pub fn expand_genres(&self, base_genres: &[TermId], top_k_per_genre: usize) -> Vec<TermId> {
        let mut expanded = OrderedSet::default();
        for &genre in base_genres {
            expanded.insert(genre);
        }
        for &genre in base_genres {
            for &(other, _) in self.cooccurring_genres(genre).iter().take(top_k_per_genre) {
                expanded.insert(other);
            }
        }
        expanded.into_vec()
    }

    /// Collect up to `max_candidates` distinct documents: genre buckets first
    /// (in `genres` order), then title-term postings (in `query_terms` order).
    ///
    /// Stops at the cap, so on large corpora coverage is partial and genre
    /// matches win over title matches. The result is sorted by doc id.
    pub fn collect_candidates(
        &self,
        query_terms: &[TermId],
        genres: &[TermId],
        max_candidates: usize,
    ) -> Vec<DocId> {
        let mut visited = vec![false; self.num_docs()];
        let mut collected: Vec<DocId> = Vec::with_capacity(max_candidates.min(self.num_docs()));

        let genre_docs = genres.iter().flat_map(|&g| self.genre_bucket(g).iter().copied());
        let term_docs = query_terms
            .iter()
            .flat_map(|&t| self.postings(t).iter().map(|p| p.doc_id));

        for doc_id in genre_docs.chain(term_docs) {
            if collected.len() >= max_candidates {
                break;
            }
            let seen = &mut visited[doc_id as usize];
            if !*seen {
                *seen = true;
                collected.push(doc_id);
            }
        }

        collected.sort_unstable();
        collected
    }

    /// Cosine between a profile vector and each candidate, accumulated
    /// term-at-a-time over the postings.
    ///
    /// `candidates` must be sorted by doc id. The returned scores are aligned
    /// with `candidates`; all zero when the profile norm is 0.
    pub fn score_candidates_content(
        &self,
        profile_weights: &[(TermId, f32)],
        profile_norm: f32,
        candidates: &[DocId],
    ) -> Vec<f32> {
        debug_assert!(candidates.windows(2).all(|w| w[0] < w[1]));

        let mut scores = vec![0.0f32; candidates.len()];
        if profile_norm == 0.0 || candidates.is_empty() {
            return scores;
        }

        for &(term, profile_weight) in profile_weights {
            if profile_weight <= 0.0 {
                continue;
            }
            let postings = self.postings(term);
            if postings.len() <= candidates.len() {
                for posting in postings {
                    if let Ok(pos) = candidates.binary_search(&posting.doc_id) {
                        scores[pos] += profile_weight * posting.weight;
                    }
                }
            } else {
                for (pos, &doc_id) in candidates.iter().enumerate() {
                    if let Ok(i) = postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
                        scores[pos] += profile_weight * postings[i].weight;
                    }
                }
            }
        }

        for (score, &doc_id) in scores.iter_mut().zip(candidates) {
            let norm = self.document(doc_id).map(|d| d.norm).unwrap_or(0.0);
            *score = if norm > 0.0 {
                (*score / (profile_norm * norm)).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        scores
    }
}
