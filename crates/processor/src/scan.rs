//! Selects the declarations a round marks for registration.

use crate::round::{Declaration, Round};

/// Returns the declarations of `round` carrying `marker`.
///
/// The result is sorted by qualified name and free of duplicates, so validation
/// and the generated registration order do not depend on host iteration order.
/// Nothing is carried over between rounds.
pub fn scan<'r>(round: &'r Round, marker: &'r str) -> Vec<&'r Declaration> {
	let mut found: Vec<&Declaration> = round.annotated_with(marker).collect();
	found.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
	found.dedup_by(|a, b| a.qualified_name == b.qualified_name);
	tracing::debug!(marker, found = found.len(), "scanned round");
	found
}
