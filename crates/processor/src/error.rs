//! Failures a processing round can run into.

use thiserror::Error;

use crate::emit::ArtifactWriteFailure;
use crate::validate::CapabilityViolation;

/// Errors surfaced by [`crate::RunContext`].
///
/// Only [`ProcessError::MissingOption`] lets the round continue; the others
/// leave it without an artifact.
#[derive(Debug, Error)]
pub enum ProcessError {
	#[error("missing processor option `{key}`")]
	MissingOption { key: &'static str },

	#[error(transparent)]
	Violation(#[from] CapabilityViolation),

	#[error("required capability `{0}` could not be resolved")]
	UnresolvedCapability(String),

	#[error(transparent)]
	Write(#[from] ArtifactWriteFailure),
}
