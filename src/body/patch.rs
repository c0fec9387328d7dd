//! Single-field patch selection.

use crate::error::AppError;
use serde_json::{Map, Value};

/// The field a patch request updates: the last key in submission order.
///
/// Bodies are insertion-ordered maps, so with several keys the last one submitted wins.
pub fn select_patch_field(body: &Map<String, Value>) -> Result<String, AppError> {
    body.keys().next_back().cloned().ok_or(AppError::EmptyPatch)
}
