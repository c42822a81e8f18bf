//! Build script driver.
//!
//! ```ignore
//! // build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     modev_processor::cargo::BuildScript::from_env()?
//!         .option("MODULE_NAME", env!("CARGO_PKG_NAME").replace('-', "_"))
//!         .run()?;
//!     Ok(())
//! }
//! ```
//!
//! The generated loader lands in `$OUT_DIR/modev_generated/` and is pulled in
//! with `modev_data::include_module_data_loader!`. Error diagnostics are
//! printed as `cargo::error=` lines, which fail the build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fs_host::{DiagnosticStyle, FsHost};
use crate::processor::{ModuleEventReceiverProcessor, RoundOutcome};
use crate::source::{self, SourceError};

/// Prefix of environment variables that supply processor options.
pub const OPTION_ENV_PREFIX: &str = "MODEV_";

#[derive(Debug, Error)]
pub enum BuildScriptError {
	#[error("environment variable {0} is not set; run from a Cargo build script")]
	MissingEnv(&'static str),

	#[error(transparent)]
	Source(#[from] SourceError),
}

/// Runs the processor over the package's sources from `build.rs`.
#[derive(Debug, Clone)]
pub struct BuildScript {
	manifest_dir: PathBuf,
	out_dir: PathBuf,
	crate_name: String,
	src_dir: PathBuf,
	options: BTreeMap<String, String>,
	processor: ModuleEventReceiverProcessor,
}

impl BuildScript {
	/// Reads `CARGO_MANIFEST_DIR`, `OUT_DIR` and `CARGO_PKG_NAME`.
	pub fn from_env() -> Result<Self, BuildScriptError> {
		let var = |key: &'static str| std::env::var_os(key).ok_or(BuildScriptError::MissingEnv(key));
		let manifest_dir = PathBuf::from(var("CARGO_MANIFEST_DIR")?);
		let out_dir = PathBuf::from(var("OUT_DIR")?);
		let crate_name = var("CARGO_PKG_NAME")?.to_string_lossy().into_owned();
		Ok(Self::new(manifest_dir, out_dir, crate_name))
	}

	pub fn new(manifest_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, crate_name: impl Into<String>) -> Self {
		let manifest_dir = manifest_dir.into();
		Self {
			src_dir: manifest_dir.join("src"),
			manifest_dir,
			out_dir: out_dir.into(),
			crate_name: crate_name.into(),
			options: BTreeMap::new(),
			processor: ModuleEventReceiverProcessor::new(),
		}
	}

	/// Sets a processor option, overriding any `MODEV_<KEY>` environment value.
	pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	/// Source directory relative to the manifest directory. Defaults to `src`.
	pub fn src_dir(mut self, rel: impl AsRef<Path>) -> Self {
		self.src_dir = self.manifest_dir.join(rel);
		self
	}

	pub fn processor(mut self, processor: ModuleEventReceiverProcessor) -> Self {
		self.processor = processor;
		self
	}

	/// Loads the sources and processes them as a single round.
	pub fn run(self) -> Result<RoundOutcome, BuildScriptError> {
		let (outcome, _) = self.run_with_host()?;
		Ok(outcome)
	}

	/// Like [`BuildScript::run`], also returning the host for inspection.
	pub fn run_with_host(self) -> Result<(RoundOutcome, FsHost), BuildScriptError> {
		println!("cargo:rerun-if-changed={}", self.src_dir.display());
		let sources = source::load(&self.src_dir, &self.crate_name, &self.processor.config().marker)?;
		for file in &sources.files {
			println!("cargo:rerun-if-changed={}", file.display());
		}

		let options = self.resolve_options(|key| {
			println!("cargo:rerun-if-env-changed={key}");
			std::env::var(key).ok()
		});
		let mut host = FsHost::new(&self.out_dir, sources.types, DiagnosticStyle::Cargo).with_options(options);

		let outcome = self.processor.process_round(&mut host, &sources.round);
		Ok((outcome, host))
	}

	/// Explicit options win over `MODEV_<KEY>` values from `env`.
	fn resolve_options(&self, mut env: impl FnMut(&str) -> Option<String>) -> BTreeMap<String, String> {
		let mut options = BTreeMap::new();
		for key in ModuleEventReceiverProcessor::supported_options() {
			if let Some(value) = env(&format!("{OPTION_ENV_PREFIX}{key}")) {
				options.insert((*key).to_owned(), value);
			}
		}
		for (key, value) in &self.options {
			if !ModuleEventReceiverProcessor::supported_options().contains(&key.as_str()) {
				tracing::debug!(key = %key, "ignoring unsupported processor option");
				continue;
			}
			options.insert(key.clone(), value.clone());
		}
		options
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_options_override_environment() {
		let script = BuildScript::new("/p", "/o", "app").option("MODULE_NAME", "explicit");
		let options = script.resolve_options(|key| (key == "MODEV_MODULE_NAME").then(|| "from-env".to_owned()));
		assert_eq!(options.get("MODULE_NAME").map(String::as_str), Some("explicit"));
	}

	#[test]
	fn environment_supplies_missing_options() {
		let script = BuildScript::new("/p", "/o", "app");
		let options = script.resolve_options(|key| (key == "MODEV_MODULE_NAME").then(|| "auth".to_owned()));
		assert_eq!(options.get("MODULE_NAME").map(String::as_str), Some("auth"));
	}

	#[test]
	fn unsupported_options_are_dropped() {
		let script = BuildScript::new("/p", "/o", "app").option("VERBOSE", "1");
		assert!(script.resolve_options(|_| None).is_empty());
	}

	#[test]
	fn src_dir_is_relative_to_manifest() {
		let script = BuildScript::new("/p", "/o", "app").src_dir("lib");
		assert_eq!(script.src_dir, PathBuf::from("/p/lib"));
	}
}
