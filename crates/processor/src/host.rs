//! Interface to the toolchain hosting a processing round.
//!
//! The pipeline never touches the filesystem or the build log directly; every
//! option lookup, type query, diagnostic and artifact goes through
//! [`BuildContext`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::round::Declaration;

/// Severity of a [`Diagnostic`]. [`Severity::Error`] fails the build by host convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	Note,
	Warning,
	Error,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Note => "note",
			Self::Warning => "warning",
			Self::Error => "error",
		})
	}
}

/// Source position of a declaration. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
	pub file: PathBuf,
	pub line: usize,
	pub column: usize,
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.file.display(), self.line, self.column + 1)
	}
}

/// A user-visible build log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub severity: Severity,
	pub message: String,
	/// Qualified name of the declaration the entry is attributed to.
	pub declaration: Option<String>,
	pub location: Option<Location>,
}

impl Diagnostic {
	pub fn new(severity: Severity, message: impl Into<String>) -> Self {
		Self {
			severity,
			message: message.into(),
			declaration: None,
			location: None,
		}
	}

	/// Attributes the diagnostic to `declaration`.
	pub fn at(mut self, declaration: &Declaration) -> Self {
		self.declaration = Some(declaration.qualified_name.clone());
		self.location = declaration.location.clone();
		self
	}

	/// For sinks that carry the severity themselves, such as `tracing` levels.
	pub fn detail(&self) -> Detail<'_> {
		Detail(self)
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.severity, self.detail())
	}
}

/// Message and attribution of a [`Diagnostic`], without the severity prefix.
#[derive(Debug, Clone, Copy)]
pub struct Detail<'a>(&'a Diagnostic);

impl fmt::Display for Detail<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let diagnostic = self.0;
		f.write_str(&diagnostic.message)?;
		match (&diagnostic.declaration, &diagnostic.location) {
			(Some(decl), Some(loc)) => write!(f, " (`{decl}` at {loc})"),
			(Some(decl), None) => write!(f, " (`{decl}`)"),
			(None, Some(loc)) => write!(f, " (at {loc})"),
			(None, None) => Ok(()),
		}
	}
}

/// Opaque handle to a type known to the host's type system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeHandle(String);

impl TypeHandle {
	pub fn new(qualified_name: impl Into<String>) -> Self {
		Self(qualified_name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Last path segment, e.g. `ModuleEventListener` for `modev_data::ModuleEventListener`.
	pub fn simple_name(&self) -> &str {
		self.0.rsplit("::").next().unwrap_or(&self.0)
	}
}

impl fmt::Display for TypeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Failure to persist a generated artifact.
#[derive(Debug, Error)]
pub enum WriteError {
	#[error("failed to write {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("{package}::{type_name} was already generated in this session")]
	AlreadyWritten { package: String, type_name: String },
}

/// Services the hosting toolchain provides to one processing round.
pub trait BuildContext {
	/// Looks up a build-configured processor option.
	fn option(&self, key: &str) -> Option<String>;

	/// Resolves a fully qualified type name.
	fn resolve_type(&self, qualified_name: &str) -> Option<TypeHandle>;

	/// Whether `ty` is identical to, or implements, `of`.
	fn is_subtype(&self, ty: &TypeHandle, of: &TypeHandle) -> bool;

	/// Appends an entry to the build log.
	fn report(&mut self, diagnostic: Diagnostic);

	/// Persists generated source `content` as `type_name` inside `package`.
	fn write_artifact(&mut self, package: &str, type_name: &str, content: &str) -> Result<(), WriteError>;
}
