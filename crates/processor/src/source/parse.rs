//! Collects marked declarations and trait impls from parsed files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use syn::{Attribute, Ident, Item, UseTree};

use super::SourceError;
use super::types::TypeTable;
use crate::host::Location;
use crate::marker::{MarkerArgs, is_marker};
use crate::round::{Declaration, Round};

/// A path as written, before resolution.
#[derive(Debug, Clone)]
struct RawPath {
	leading_colon: bool,
	segments: Vec<String>,
}

impl From<&syn::Path> for RawPath {
	fn from(path: &syn::Path) -> Self {
		Self {
			leading_colon: path.leading_colon.is_some(),
			segments: path.segments.iter().map(|seg| seg.ident.to_string()).collect(),
		}
	}
}

/// Module path plus the names its `use` items bring into scope.
#[derive(Debug, Clone)]
struct Scope {
	module: Vec<String>,
	imports: BTreeMap<String, RawPath>,
}

/// Impl blocks are resolved once every module of the tree is known.
#[derive(Debug)]
struct PendingImpl {
	scope: Scope,
	self_ty: RawPath,
	trait_path: RawPath,
}

pub(super) struct Collector<'a> {
	crate_name: &'a str,
	marker: &'a str,
	round: Round,
	types: TypeTable,
	modules: BTreeSet<Vec<String>>,
	pending: Vec<PendingImpl>,
}

impl<'a> Collector<'a> {
	pub(super) fn new(crate_name: &'a str, marker: &'a str) -> Self {
		Self {
			crate_name,
			marker,
			round: Round::new(),
			types: TypeTable::new(),
			modules: BTreeSet::from([vec![crate_name.to_owned()]]),
			pending: Vec::new(),
		}
	}

	pub(super) fn add_file(&mut self, path: &Path, module: &[String], content: &str) -> Result<(), SourceError> {
		let file = syn::parse_file(content).map_err(|err| SourceError::Parse {
			path: path.to_owned(),
			line: err.span().start().line,
			message: err.to_string(),
		})?;
		self.register_module(module);
		self.items(path, module, &file.items)
	}

	pub(super) fn finish(mut self) -> (Round, TypeTable) {
		for pending in std::mem::take(&mut self.pending) {
			let ty = self.resolve(&pending.scope, &pending.self_ty);
			let trait_name = self.resolve(&pending.scope, &pending.trait_path);
			self.types.add_impl(ty, trait_name);
		}
		(self.round, self.types)
	}

	fn register_module(&mut self, module: &[String]) {
		for len in 1..=module.len() {
			self.modules.insert(module[..len].to_vec());
		}
	}

	fn items(&mut self, path: &Path, module: &[String], items: &[Item]) -> Result<(), SourceError> {
		let scope = Scope {
			module: module.to_vec(),
			imports: imports(items),
		};

		for item in items {
			match item {
				Item::Struct(item) => self.declaration(path, module, &item.ident, &item.attrs)?,
				Item::Enum(item) => self.declaration(path, module, &item.ident, &item.attrs)?,
				Item::Union(item) => self.declaration(path, module, &item.ident, &item.attrs)?,
				Item::Trait(item) => self.types.declare(qualify(module, &item.ident)),
				Item::Impl(item) => {
					let Some((None, trait_path, _)) = &item.trait_ else {
						continue;
					};
					let syn::Type::Path(self_ty) = item.self_ty.as_ref() else {
						continue;
					};
					if self_ty.qself.is_some() {
						continue;
					}
					self.pending.push(PendingImpl {
						scope: scope.clone(),
						self_ty: RawPath::from(&self_ty.path),
						trait_path: RawPath::from(trait_path),
					});
				}
				Item::Mod(item) => {
					if let Some((_, inner)) = &item.content {
						let mut child = module.to_vec();
						child.push(item.ident.to_string());
						self.register_module(&child);
						self.items(path, &child, inner)?;
					}
				}
				_ => {}
			}
		}
		Ok(())
	}

	fn declaration(&mut self, path: &Path, module: &[String], ident: &Ident, attrs: &[Attribute]) -> Result<(), SourceError> {
		let qualified_name = qualify(module, ident);
		self.types.declare(qualified_name.clone());

		let Some(attr) = attrs.iter().find(|attr| is_marker(attr, self.marker)) else {
			return Ok(());
		};
		let args = MarkerArgs::from_attribute(attr).map_err(|err| SourceError::Marker {
			path: path.to_owned(),
			line: err.span().start().line,
			marker: self.marker.to_owned(),
			message: err.to_string(),
		})?;

		let start = ident.span().start();
		self.round.push(
			Declaration::new(qualified_name)
				.with_marker(self.marker, args)
				.with_location(Location {
					file: path.to_owned(),
					line: start.line,
					column: start.column,
				}),
		);
		Ok(())
	}

	fn resolve(&self, scope: &Scope, path: &RawPath) -> String {
		if !path.leading_colon
			&& let Some(import) = path.segments.first().and_then(|first| scope.imports.get(first))
		{
			let composed = RawPath {
				leading_colon: import.leading_colon,
				segments: import.segments.iter().chain(&path.segments[1..]).cloned().collect(),
			};
			return self.absolute(&scope.module, &composed, false).join("::");
		}
		self.absolute(&scope.module, path, true).join("::")
	}

	/// Anchors `path` at the crate root.
	///
	/// Paths starting at a child module of `module` are relative; other
	/// multi-segment paths name another crate. A lone name is local when
	/// `local_fallback` is set.
	fn absolute(&self, module: &[String], path: &RawPath, local_fallback: bool) -> Vec<String> {
		let segments = &path.segments;
		let Some(first) = segments.first() else {
			return Vec::new();
		};
		if path.leading_colon {
			return segments.clone();
		}

		match first.as_str() {
			"crate" => {
				return std::iter::once(self.crate_name.to_owned())
					.chain(segments[1..].iter().cloned())
					.collect();
			}
			"self" => return module.iter().chain(&segments[1..]).cloned().collect(),
			"super" => {
				let mut base = module.to_vec();
				let mut rest = &segments[..];
				while rest.first().is_some_and(|seg| seg == "super") {
					if base.len() > 1 {
						base.pop();
					}
					rest = &rest[1..];
				}
				base.extend(rest.iter().cloned());
				return base;
			}
			_ => {}
		}

		let mut local = module.to_vec();
		local.extend(segments.iter().cloned());
		let starts_at_child = self.modules.contains(&local[..=module.len()]);
		if starts_at_child || (local_fallback && segments.len() == 1) {
			local
		} else {
			segments.clone()
		}
	}
}

fn qualify(module: &[String], ident: &Ident) -> String {
	let mut name = module.join("::");
	name.push_str("::");
	name.push_str(&ident.to_string());
	name
}

/// Names brought into scope by the `use` items of one module. Globs are skipped.
fn imports(items: &[Item]) -> BTreeMap<String, RawPath> {
	let mut out = BTreeMap::new();
	for item in items {
		let Item::Use(item) = item else {
			continue;
		};
		let mut prefix = RawPath {
			leading_colon: item.leading_colon.is_some(),
			segments: Vec::new(),
		};
		flatten_use(&item.tree, &mut prefix, &mut out);
	}
	out
}

fn flatten_use(tree: &UseTree, prefix: &mut RawPath, out: &mut BTreeMap<String, RawPath>) {
	match tree {
		UseTree::Path(path) => {
			prefix.segments.push(path.ident.to_string());
			flatten_use(&path.tree, prefix, out);
			prefix.segments.pop();
		}
		UseTree::Name(name) => {
			if name.ident == "self" {
				if let Some(last) = prefix.segments.last() {
					out.insert(last.clone(), prefix.clone());
				}
			} else {
				let mut full = prefix.clone();
				full.segments.push(name.ident.to_string());
				out.insert(name.ident.to_string(), full);
			}
		}
		UseTree::Rename(rename) => {
			let mut full = prefix.clone();
			if rename.ident != "self" {
				full.segments.push(rename.ident.to_string());
			}
			out.insert(rename.rename.to_string(), full);
		}
		UseTree::Glob(_) => {}
		UseTree::Group(group) => {
			for tree in &group.items {
				flatten_use(tree, prefix, out);
			}
		}
	}
}
