//! Filter implementations for the ranking pipeline.

pub mod exclude_liked;
pub mod min_score;
pub mod target_type;

// Re-export for convenience
pub use exclude_liked::ExcludeLikedFilter;
pub use min_score::MinScoreFilter;
pub use target_type::TargetTypeFilter;
