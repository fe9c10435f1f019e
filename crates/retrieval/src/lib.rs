//! # Retrieval Crate
//!
//! The sparse retrieval side of the recommendation engine.
//!
//! ## Components
//!
//! ### Content Index
//! Inverted index over item titles and genres:
//! - Tokenizer: unigrams + adjacent bigrams, namespaced genre terms
//! - TF-IDF document vectors with precomputed norms
//! - Postings lists sorted by doc id, genre buckets, genre co-occurrence
//!
//! ### Interaction Graph
//! Collaborative filtering over likes and purchases:
//! - "Users who liked what you liked also liked..."
//! - Popularity counts, dampened two-hop expansion
//!
//! ### Candidate Generator
//! Bounded union of content and collaborative candidates for one profile.
//!
//! ## Example Usage
//!
//! ```ignore
//! use retrieval::{CandidateGenerator, ContentIndex, InteractionGraph};
//!
//! let index = ContentIndex::rebuild(&corpus);
//! let graph = InteractionGraph::new();
//!
//! let profile = index.build_user_profile(&liked_doc_ids);
//! let candidates = CandidateGenerator::new().generate(&index, &graph, &profile, 500);
//! let doc_ids: Vec<_> = candidates.iter().map(|c| c.doc_id).collect();
//! let content_scores = index.score_profile(&profile, &doc_ids);
//! ```

pub mod candidates;
pub mod content_index;
pub mod interaction_graph;
pub mod profile;
pub mod tokenizer;

pub use candidates::{Candidate, CandidateGenerator, CandidateSource};
pub use content_index::{ContentIndex, DocId, Document, Posting, TermId};
pub use interaction_graph::{InteractionGraph, KeepAll, MinTimestamp, RetentionPolicy};
pub use profile::UserProfile;
