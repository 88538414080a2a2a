//! Extraction over rendered DOM snapshots.
//!
//! Pages are rendered by a [`crate::renderer::RenderContext`], serialized, and
//! parsed here. All field lookups after that point are synchronous.

pub mod page;
pub mod selectors;
pub mod stat_labels;

pub use page::{extract_or_default, Extracted, RenderedPage};
