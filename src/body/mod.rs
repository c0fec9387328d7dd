//! Request body normalization for writes.

pub mod flatten;
pub mod patch;

pub use flatten::{flatten, has_nested_references};
pub use patch::select_patch_field;
