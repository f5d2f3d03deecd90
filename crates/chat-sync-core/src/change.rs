//! Change detection between successive log snapshots.

use crate::ChatLogEntry;

/// Whether `next` should be published given what was published before.
///
/// Logs are equal when they have the same length and every entry matches
/// positionally on timestamp, author and text. Nothing published yet
/// (`None`) always counts as changed, even when `next` is empty.
#[must_use]
pub fn has_changed(previous: Option<&[ChatLogEntry]>, next: &[ChatLogEntry]) -> bool {
    previous.is_none_or(|previous| {
        previous.len() != next.len() || previous.iter().zip(next).any(|(a, b)| a != b)
    })
}
