//! Rust source host input: turns a crate's `src` tree into a [`Round`] and a [`TypeTable`].
//!
//! Qualified names follow the module layout: `src/lib.rs` and `src/main.rs`
//! are the crate root, `src/a.rs` and `src/a/mod.rs` are module `a`, and
//! inline `mod` blocks nest further. Every declaration is named
//! `<crate>::<module path>::<Ident>`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::round::Round;

mod parse;
#[cfg(test)]
mod tests;
mod types;

pub use types::TypeTable;

/// Failures while reading a source tree.
#[derive(Debug, Error)]
pub enum SourceError {
	#[error("failed to walk {root}: {source}")]
	Walk {
		root: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("{}:{line}: {message}", path.display())]
	Parse { path: PathBuf, line: usize, message: String },

	#[error("{}:{line}: invalid #[{marker}] arguments: {message}", path.display())]
	Marker {
		path: PathBuf,
		line: usize,
		marker: String,
		message: String,
	},
}

/// Everything the host knows after reading a source tree.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
	pub round: Round,
	pub types: TypeTable,
	/// Files read, sorted.
	pub files: Vec<PathBuf>,
}

/// Reads every `.rs` file under `src_dir` as crate `crate_name`, selecting `marker`.
pub fn load(src_dir: &Path, crate_name: &str, marker: &str) -> Result<SourceSet, SourceError> {
	let crate_name = normalize_crate_name(crate_name);
	let files = collect_files_sorted(src_dir)?;
	let mut collector = parse::Collector::new(&crate_name, marker);

	for file in &files {
		let content = fs::read_to_string(file).map_err(|source| SourceError::Read {
			path: file.clone(),
			source,
		})?;
		let module = module_path(&crate_name, src_dir, file);
		collector.add_file(file, &module, &content)?;
	}

	let (round, types) = collector.finish();
	tracing::debug!(
		src = %src_dir.display(),
		files = files.len(),
		declarations = round.declarations().len(),
		"loaded source tree"
	);
	Ok(SourceSet { round, types, files })
}

/// Package names may contain `-`; paths use `_`.
pub fn normalize_crate_name(name: &str) -> String {
	name.replace('-', "_")
}

/// Collects all `.rs` files under `root`, sorted by path for determinism.
pub fn collect_files_sorted(root: &Path) -> Result<Vec<PathBuf>, SourceError> {
	let mut paths = Vec::new();
	for entry in WalkDir::new(root) {
		let entry = entry.map_err(|source| SourceError::Walk {
			root: root.to_owned(),
			source,
		})?;
		if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "rs") {
			paths.push(entry.into_path());
		}
	}
	paths.sort();
	Ok(paths)
}

/// Module path of `file` relative to `src_dir`, starting with the crate name.
pub fn module_path(crate_name: &str, src_dir: &Path, file: &Path) -> Vec<String> {
	let rel = file.strip_prefix(src_dir).unwrap_or(file).with_extension("");
	let components: Vec<String> = rel
		.components()
		.map(|c| c.as_os_str().to_string_lossy().into_owned())
		.collect();

	let mut module = vec![crate_name.to_owned()];
	let count = components.len();
	for (i, component) in components.into_iter().enumerate() {
		let last = i + 1 == count;
		let crate_root = count == 1 && (component == "lib" || component == "main");
		if last && (component == "mod" || crate_root) {
			continue;
		}
		module.push(component);
	}
	module
}
