//! Declarations under compilation in one processing round.

use std::collections::{BTreeMap, BTreeSet};

use crate::host::{Location, TypeHandle};
use crate::marker::MarkerArgs;

/// A type declaration seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	pub qualified_name: String,
	/// Static type of the declaration; for a struct or enum, the type it declares.
	pub ty: TypeHandle,
	pub location: Option<Location>,
	/// Marker instances keyed by marker name.
	pub markers: BTreeMap<String, MarkerArgs>,
}

impl Declaration {
	pub fn new(qualified_name: impl Into<String>) -> Self {
		let qualified_name = qualified_name.into();
		Self {
			ty: TypeHandle::new(qualified_name.clone()),
			qualified_name,
			location: None,
			markers: BTreeMap::new(),
		}
	}

	pub fn with_marker(mut self, marker: impl Into<String>, args: MarkerArgs) -> Self {
		self.markers.insert(marker.into(), args);
		self
	}

	pub fn with_location(mut self, location: Location) -> Self {
		self.location = Some(location);
		self
	}

	pub fn marker(&self, marker: &str) -> Option<&MarkerArgs> {
		self.markers.get(marker)
	}

	/// Last path segment of the qualified name.
	pub fn simple_name(&self) -> &str {
		self.ty.simple_name()
	}
}

/// Annotation-indexed declaration table for one round.
#[derive(Debug, Clone, Default)]
pub struct Round {
	declarations: Vec<Declaration>,
}

impl Round {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, declaration: Declaration) {
		self.declarations.push(declaration);
	}

	pub fn declarations(&self) -> &[Declaration] {
		&self.declarations
	}

	/// Declarations carrying `marker`, in host order.
	pub fn annotated_with<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a Declaration> + 'a {
		self.declarations.iter().filter(move |decl| decl.markers.contains_key(marker))
	}

	/// Every marker name used somewhere in the round.
	pub fn markers(&self) -> BTreeSet<&str> {
		self.declarations
			.iter()
			.flat_map(|decl| decl.markers.keys().map(String::as_str))
			.collect()
	}
}

impl FromIterator<Declaration> for Round {
	fn from_iter<I: IntoIterator<Item = Declaration>>(iter: I) -> Self {
		Self {
			declarations: iter.into_iter().collect(),
		}
	}
}
