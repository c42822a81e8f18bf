//! Trait implementation table recovered from source.

use std::collections::{BTreeMap, BTreeSet};

use crate::host::TypeHandle;

/// Types and traits declared in a source tree, plus which types implement which traits.
///
/// Trait paths that do not name a trait declared in the tree (glob imports,
/// re-exports through another crate) match a capability by their last
/// segment.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
	declared: BTreeSet<String>,
	impls: BTreeMap<String, BTreeSet<String>>,
}

impl TypeTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a type or trait declared in the tree.
	pub fn declare(&mut self, qualified_name: impl Into<String>) {
		self.declared.insert(qualified_name.into());
	}

	pub fn is_declared(&self, qualified_name: &str) -> bool {
		self.declared.contains(qualified_name)
	}

	/// Records `impl trait_name for ty`.
	pub fn add_impl(&mut self, ty: impl Into<String>, trait_name: impl Into<String>) {
		self.impls.entry(ty.into()).or_default().insert(trait_name.into());
	}

	/// Traits implemented by `ty`, sorted.
	pub fn traits_of(&self, ty: &str) -> impl Iterator<Item = &str> {
		self.impls.get(ty).into_iter().flatten().map(String::as_str)
	}

	/// Normalizes `qualified_name` into a handle. Fails only for malformed paths.
	pub fn resolve(&self, qualified_name: &str) -> Option<TypeHandle> {
		let name = qualified_name.trim().trim_start_matches("::");
		let well_formed = !name.is_empty()
			&& name
				.split("::")
				.all(|seg| !seg.is_empty() && seg.chars().all(|c| c == '_' || c.is_alphanumeric()));
		well_formed.then(|| TypeHandle::new(name))
	}

	/// Whether `ty` is `of` or implements it.
	pub fn is_subtype(&self, ty: &TypeHandle, of: &TypeHandle) -> bool {
		if ty == of {
			return true;
		}
		self.traits_of(ty.as_str()).any(|trait_name| {
			trait_name == of.as_str()
				|| (!self.is_declared(trait_name) && TypeHandle::new(trait_name).simple_name() == of.simple_name())
		})
	}
}
