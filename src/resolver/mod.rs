//! # Label and offset resolution
//!
//! Two independent passes run after a method body is assembled:
//!
//! - [`recalculate_offsets`] renumbers instructions densely and rewrites
//!   every jump's relative delta from its instruction target.
//! - [`Listing::optimize`] cleans up the label rows of a text listing:
//!   labels nothing jumps to are dropped, and runs of labels that mark the
//!   same row collapse into the first one.

pub mod labels;
pub mod offsets;

pub use labels::{LabelRef, Listing, Row};
pub use offsets::{recalculate_offsets, resolve_source_targets, SourceBoundary};
