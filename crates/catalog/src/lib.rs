//! # Catalog Crate
//!
//! Domain types and raw storage for the recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: Items, item keys, interactions and event kinds
//! - **corpus**: Insertion-ordered item store with upsert / full replace
//! - **loader**: JSON / JSON Lines feed parsing
//! - **error**: Error types for feed loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{Corpus, loader};
//! use std::path::Path;
//!
//! let dataset = loader::load_dataset(Path::new("data"))?;
//! let corpus = Corpus::from_records(dataset.items);
//! println!("{} items", corpus.len());
//! ```

pub mod corpus;
pub mod error;
pub mod loader;
pub mod types;

pub use corpus::Corpus;
pub use error::{CatalogError, Result};
pub use loader::Dataset;
pub use types::{
    Interaction, InteractionEvent, ItemId, ItemKey, ItemRecord, ItemRef, ItemType, UserId,
};
