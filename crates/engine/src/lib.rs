//! Engine crate for the recommendation service.
//!
//! This crate contains the service object that owns the corpus, the
//! published index snapshot and the interaction graph, and coordinates the
//! retrieval and ranking stages for each request.

pub mod config;
pub mod error;
pub mod service;

pub use config::{EngineConfig, MAX_LIMIT, RecommendDefaults, RecommendRequest};
pub use error::{EngineError, Result};
pub use service::{
    HealthReport, IndexReport, RecommendationService, SearchHit, StatsReport, SyncInteractionsReport,
};
