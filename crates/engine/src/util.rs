//! Internal helpers for name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! normalization so the engine enforces consistent invariants on tag and
//! user-facing names.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Normalize a tag name for display: NFC, trimmed, internal whitespace runs
/// collapsed to single spaces.
pub(crate) fn normalize_tag_name(value: &str) -> ResultEngine<String> {
    let normalized: String = value.nfc().collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidName(
            "tag name must not be empty".to_string(),
        ));
    }
    Ok(collapsed)
}

/// Slug used for the per-user uniqueness constraint: the display form
/// lowercased.
pub(crate) fn make_slug(display: &str) -> String {
    display.to_lowercase()
}

/// Trim a required free-text field, rejecting empty values.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}
