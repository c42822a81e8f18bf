//! Run context and the scan → validate → extract → emit pipeline.

use modev_data::{KEY_MODULE_NAME, LISTENER_TRAIT, MARKER_NAME};
use tracing::{debug, info, warn};

use crate::emit::{Artifact, ArtifactWriteFailure, emit, render};
use crate::error::ProcessError;
use crate::extract::extract;
use crate::host::{BuildContext, Diagnostic, Severity, TypeHandle};
use crate::round::{Declaration, Round};
use crate::scan::scan;
use crate::validate::validate_all;


/// Line separator of the platform the processor runs on.
pub fn platform_line_separator() -> &'static str {
	if cfg!(windows) { "\r\n" } else { "\n" }
}

/// Settings fixed for the lifetime of a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
	/// Marker selecting receivers.
	pub marker: String,
	/// Qualified name of the capability receivers must implement.
	pub capability: String,
	/// Separator between generated lines.
	pub line_separator: String,
}

impl Default for ProcessorConfig {
	fn default() -> Self {
		Self {
			marker: MARKER_NAME.to_owned(),
			capability: LISTENER_TRAIT.to_owned(),
			line_separator: platform_line_separator().to_owned(),
		}
	}
}

/// Whether the module name option was found when the round started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
	Unconfigured,
	Configured,
}

/// Result of processing one round.
#[derive(Debug)]
pub enum RoundOutcome {
	/// No declaration in the round carries the marker.
	Skipped,
	/// Generation was abandoned; the cause has been reported to the host.
	Aborted(ProcessError),
	Generated(Artifact),
	/// The artifact was rendered but the host could not persist it.
	WriteFailed {
		artifact: Artifact,
		failure: ArtifactWriteFailure,
	},
}

impl RoundOutcome {
	/// Whether the round used the marker at all.
	pub fn claimed(&self) -> bool {
		!matches!(self, Self::Skipped)
	}

	/// The artifact that reached the host, if any.
	pub fn artifact(&self) -> Option<&Artifact> {
		match self {
			Self::Generated(artifact) => Some(artifact),
			_ => None,
		}
	}

	pub fn into_result(self) -> Result<Option<Artifact>, ProcessError> {
		match self {
			Self::Skipped => Ok(None),
			Self::Generated(artifact) => Ok(Some(artifact)),
			Self::Aborted(err) => Err(err),
			Self::WriteFailed { failure, .. } => Err(ProcessError::Write(failure)),
		}
	}
}

/// State of one round: resolved configuration plus exclusive use of the host.
pub struct RunContext<'h, C: BuildContext + ?Sized> {
	host: &'h mut C,
	config: ProcessorConfig,
	state: ConfigState,
	module_name: String,
	capability: Option<TypeHandle>,
}

impl<'h, C: BuildContext + ?Sized> RunContext<'h, C> {
	/// Starts a round, reading the module name option once.
	///
	/// A missing or empty name is reported as an error but does not stop the
	/// round: processing continues with an empty module name.
	pub fn init(host: &'h mut C, config: ProcessorConfig) -> Self {
		let mut ctx = Self {
			host,
			config,
			state: ConfigState::Unconfigured,
			module_name: String::new(),
			capability: None,
		};

		match ctx.host.option(KEY_MODULE_NAME).filter(|name| !name.is_empty()) {
			Some(name) => {
				if !is_ident_fragment(&name) {
					ctx.warning(
						format!("module name `{name}` is not a valid identifier fragment; the generated loader type will not compile"),
						None,
					);
				}
				debug!(module = %name, "module name configured");
				ctx.module_name = name;
				ctx.state = ConfigState::Configured;
			}
			None => {
				let message = missing_module_name_message(&ctx.config.line_separator);
				ctx.error(message, None);
			}
		}
		ctx
	}

	pub fn state(&self) -> ConfigState {
		self.state
	}

	pub fn module_name(&self) -> &str {
		&self.module_name
	}

	pub fn note(&mut self, message: impl Into<String>, declaration: Option<&Declaration>) {
		self.report(Severity::Note, message.into(), declaration);
	}

	pub fn warning(&mut self, message: impl Into<String>, declaration: Option<&Declaration>) {
		self.report(Severity::Warning, message.into(), declaration);
	}

	pub fn error(&mut self, message: impl Into<String>, declaration: Option<&Declaration>) {
		self.report(Severity::Error, message.into(), declaration);
	}

	fn report(&mut self, severity: Severity, message: String, declaration: Option<&Declaration>) {
		let mut diagnostic = Diagnostic::new(severity, message);
		if let Some(decl) = declaration {
			diagnostic = diagnostic.at(decl);
		}
		self.host.report(diagnostic);
	}

	/// Runs the pipeline over `round`.
	///
	/// An empty scan ends the round without output. Otherwise every scanned
	/// declaration is validated before anything is extracted; the first
	/// violation aborts the round and no artifact is written, however many
	/// other declarations were valid.
	pub fn process(&mut self, round: &Round) -> RoundOutcome {
		let marker = self.config.marker.clone();
		let declarations = scan(round, &marker);
		if declarations.is_empty() {
			return RoundOutcome::Skipped;
		}

		let required = match self.required_capability() {
			Ok(required) => required,
			Err(err) => {
				self.error(err.to_string(), None);
				return RoundOutcome::Aborted(err);
			}
		};

		if let Err((decl, violation)) = validate_all(&declarations, &required, &*self.host) {
			self.error(violation.to_string(), Some(decl));
			return RoundOutcome::Aborted(violation.into());
		}

		let descriptors: Vec<_> = declarations
			.iter()
			.map(|decl| extract(decl, &marker, &self.module_name))
			.collect();
		let artifact = render(&self.module_name, &descriptors, &self.config.line_separator);

		match emit(&mut *self.host, &artifact) {
			Ok(()) => {
				info!(
					loader = %artifact.type_name,
					receivers = descriptors.len(),
					"generated module data loader"
				);
				RoundOutcome::Generated(artifact)
			}
			Err(failure) => {
				warn!(error = %failure, "generated loader was not written");
				self.warning(failure.to_string(), None);
				RoundOutcome::WriteFailed { artifact, failure }
			}
		}
	}

	/// Resolves the capability on first use and keeps it for the round.
	fn required_capability(&mut self) -> Result<TypeHandle, ProcessError> {
		if let Some(handle) = &self.capability {
			return Ok(handle.clone());
		}
		let handle = self
			.host
			.resolve_type(&self.config.capability)
			.ok_or_else(|| ProcessError::UnresolvedCapability(self.config.capability.clone()))?;
		self.capability = Some(handle.clone());
		Ok(handle)
	}
}

/// Entry point hosts drive once per round.
#[derive(Debug, Clone, Default)]
pub struct ModuleEventReceiverProcessor {
	config: ProcessorConfig,
}

impl ModuleEventReceiverProcessor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: ProcessorConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &ProcessorConfig {
		&self.config
	}

	/// Markers this processor consumes.
	pub fn supported_markers(&self) -> Vec<&str> {
		vec![self.config.marker.as_str()]
	}

	/// Option keys this processor reads.
	pub fn supported_options() -> &'static [&'static str] {
		&[KEY_MODULE_NAME]
	}

	/// Processes one round with a freshly initialized [`RunContext`].
	pub fn process_round<C>(&self, host: &mut C, round: &Round) -> RoundOutcome
	where
		C: BuildContext + ?Sized,
	{
		RunContext::init(host, self.config.clone()).process(round)
	}
}

/// Whether `name` can follow `ModuleDataLoader_` in an identifier.
fn is_ident_fragment(name: &str) -> bool {
	let candidate = format!("M_{name}");
	syn::parse_str::<syn::Ident>(&candidate).is_ok_and(|ident| ident == candidate)
}

fn missing_module_name_message(line_separator: &str) -> String {
	let key = KEY_MODULE_NAME;
	[
		ProcessError::MissingOption { key }.to_string(),
		"Pass the module's name to the processor, for example from build.rs:".to_owned(),
		"    modev_processor::cargo::BuildScript::from_env()?".to_owned(),
		format!("        .option(\"{key}\", env!(\"CARGO_PKG_NAME\").replace('-', \"_\"))"),
		"        .run()?;".to_owned(),
		format!("or set MODEV_{key} in the build environment, or pass `-O {key}=<name>` to `modev generate`."),
	]
	.join(line_separator)
}
