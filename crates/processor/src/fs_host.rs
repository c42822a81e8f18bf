//! [`BuildContext`] backed by a parsed source tree and an output directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::host::{BuildContext, Diagnostic, Severity, TypeHandle, WriteError};
use crate::source::TypeTable;

/// Where diagnostics go besides the recorded list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStyle {
	/// `cargo::warning=` / `cargo::error=` lines on stdout, for build scripts.
	Cargo,
	/// `tracing` events only.
	Log,
}

/// Host for one session over a source tree.
#[derive(Debug)]
pub struct FsHost {
	out_dir: PathBuf,
	options: BTreeMap<String, String>,
	types: TypeTable,
	style: DiagnosticStyle,
	diagnostics: Vec<Diagnostic>,
	written: BTreeSet<PathBuf>,
}

impl FsHost {
	pub fn new(out_dir: impl Into<PathBuf>, types: TypeTable, style: DiagnosticStyle) -> Self {
		Self {
			out_dir: out_dir.into(),
			options: BTreeMap::new(),
			types,
			style,
			diagnostics: Vec::new(),
			written: BTreeSet::new(),
		}
	}

	pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	pub fn with_options(mut self, options: impl IntoIterator<Item = (String, String)>) -> Self {
		self.options.extend(options);
		self
	}

	pub fn out_dir(&self) -> &Path {
		&self.out_dir
	}

	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}

	pub fn has_errors(&self) -> bool {
		self.diagnostics.iter().any(|d| d.severity == Severity::Error)
	}

	/// Files written so far, sorted.
	pub fn written(&self) -> impl Iterator<Item = &Path> {
		self.written.iter().map(PathBuf::as_path)
	}

	/// Path an artifact is written to.
	pub fn artifact_path(&self, package: &str, type_name: &str) -> PathBuf {
		self.out_dir.join(package).join(format!("{type_name}.rs"))
	}
}

impl BuildContext for FsHost {
	fn option(&self, key: &str) -> Option<String> {
		self.options.get(key).cloned()
	}

	fn resolve_type(&self, qualified_name: &str) -> Option<TypeHandle> {
		self.types.resolve(qualified_name)
	}

	fn is_subtype(&self, ty: &TypeHandle, of: &TypeHandle) -> bool {
		self.types.is_subtype(ty, of)
	}

	fn report(&mut self, diagnostic: Diagnostic) {
		match diagnostic.severity {
			Severity::Note => tracing::info!("{}", diagnostic.detail()),
			Severity::Warning => tracing::warn!("{}", diagnostic.detail()),
			Severity::Error => tracing::error!("{}", diagnostic.detail()),
		}
		if self.style == DiagnosticStyle::Cargo {
			let directive = match diagnostic.severity {
				Severity::Error => "cargo::error",
				Severity::Note | Severity::Warning => "cargo::warning",
			};
			// Each line needs its own directive.
			for line in diagnostic.to_string().lines() {
				println!("{directive}={line}");
			}
		}
		self.diagnostics.push(diagnostic);
	}

	fn write_artifact(&mut self, package: &str, type_name: &str, content: &str) -> Result<(), WriteError> {
		let path = self.artifact_path(package, type_name);
		if self.written.contains(&path) {
			return Err(WriteError::AlreadyWritten {
				package: package.to_owned(),
				type_name: type_name.to_owned(),
			});
		}

		let io_err = |source| WriteError::Io {
			path: path.clone(),
			source,
		};
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(io_err)?;
		}
		fs::write(&path, content).map_err(io_err)?;

		tracing::debug!(path = %path.display(), "wrote artifact");
		self.written.insert(path);
		Ok(())
	}
}
