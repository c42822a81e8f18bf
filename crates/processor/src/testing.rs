//! In-memory [`BuildContext`] recording everything the pipeline does.

use std::collections::{BTreeMap, BTreeSet};

use crate::emit::Artifact;
use crate::host::{BuildContext, Diagnostic, Severity, TypeHandle, WriteError};

#[derive(Debug, Default)]
pub struct RecordingHost {
	pub options: BTreeMap<String, String>,
	pub implementations: BTreeSet<(String, String)>,
	pub unresolvable: BTreeSet<String>,
	pub fail_writes: bool,
	pub diagnostics: Vec<Diagnostic>,
	pub artifacts: Vec<Artifact>,
}

impl RecordingHost {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_option(mut self, key: &str, value: &str) -> Self {
		self.options.insert(key.to_owned(), value.to_owned());
		self
	}

	pub fn implements(mut self, ty: &str, capability: &str) -> Self {
		self.implementations.insert((ty.to_owned(), capability.to_owned()));
		self
	}

	pub fn unresolvable(mut self, name: &str) -> Self {
		self.unresolvable.insert(name.to_owned());
		self
	}

	pub fn failing_writes(mut self) -> Self {
		self.fail_writes = true;
		self
	}

	pub fn count(&self, severity: Severity) -> usize {
		self.diagnostics.iter().filter(|d| d.severity == severity).count()
	}
}

impl BuildContext for RecordingHost {
	fn option(&self, key: &str) -> Option<String> {
		self.options.get(key).cloned()
	}

	fn resolve_type(&self, qualified_name: &str) -> Option<TypeHandle> {
		(!self.unresolvable.contains(qualified_name)).then(|| TypeHandle::new(qualified_name))
	}

	fn is_subtype(&self, ty: &TypeHandle, of: &TypeHandle) -> bool {
		ty == of
			|| self
				.implementations
				.contains(&(ty.as_str().to_owned(), of.as_str().to_owned()))
	}

	fn report(&mut self, diagnostic: Diagnostic) {
		self.diagnostics.push(diagnostic);
	}

	fn write_artifact(&mut self, package: &str, type_name: &str, content: &str) -> Result<(), WriteError> {
		if self.fail_writes {
			return Err(WriteError::Io {
				path: format!("{package}/{type_name}.rs").into(),
				source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only output"),
			});
		}
		self.artifacts.push(Artifact {
			package: package.to_owned(),
			type_name: type_name.to_owned(),
			content: content.to_owned(),
		});
		Ok(())
	}
}
