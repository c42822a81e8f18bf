//! Capability check applied to every scanned declaration.

use thiserror::Error;

use crate::host::{BuildContext, Location, TypeHandle};
use crate::round::Declaration;

/// A marked declaration that does not implement the required capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{declaration}` must implement `{capability}` to be a module event receiver")]
pub struct CapabilityViolation {
	pub declaration: String,
	pub capability: String,
	pub location: Option<Location>,
}

/// Checks that `declaration`'s type is, or implements, `required`.
pub fn validate<C>(declaration: &Declaration, required: &TypeHandle, host: &C) -> Result<(), CapabilityViolation>
where
	C: BuildContext + ?Sized,
{
	if host.is_subtype(&declaration.ty, required) {
		return Ok(());
	}
	Err(CapabilityViolation {
		declaration: declaration.qualified_name.clone(),
		capability: required.to_string(),
		location: declaration.location.clone(),
	})
}

/// Validates `declarations` in order and stops at the first violation.
///
/// Fail-fast is deliberate: one bad receiver voids generation for the whole
/// module, and only that receiver is reported.
pub fn validate_all<'d, C>(
	declarations: &[&'d Declaration],
	required: &TypeHandle,
	host: &C,
) -> Result<(), (&'d Declaration, CapabilityViolation)>
where
	C: BuildContext + ?Sized,
{
	for decl in declarations {
		validate(decl, required, host).map_err(|violation| (*decl, violation))?;
	}
	Ok(())
}
