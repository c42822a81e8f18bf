//! Discovers `#[module_event_receiver]` declarations and generates their module loader.
//!
//! One processing round runs four stages over the host's declaration table:
//!
//! * [`scan`] selects the declarations carrying the marker, sorted by qualified name.
//! * [`validate`] checks each implements `modev_data::ModuleEventListener`; the
//!   first failure aborts the round.
//! * [`extract`] copies the marker fields into a `ModuleEventReceiverData`.
//! * [`emit`] renders `ModuleDataLoader_<module>` and hands it to the host.
//!
//! Hosts implement [`BuildContext`]. [`FsHost`] serves both the Cargo build
//! script driver in [`cargo`] and the `modev` CLI.

pub mod cargo;
pub mod emit;
mod error;
pub mod extract;
mod fs_host;
pub mod host;
pub mod marker;
mod processor;
pub mod round;
pub mod scan;
pub mod source;
#[cfg(test)]
mod testing;
pub mod validate;

pub use emit::{Artifact, ArtifactWriteFailure};
pub use error::ProcessError;
pub use fs_host::{DiagnosticStyle, FsHost};
pub use host::{BuildContext, Diagnostic, Location, Severity, TypeHandle, WriteError};
pub use marker::MarkerArgs;
pub use processor::{
	ConfigState, ModuleEventReceiverProcessor, ProcessorConfig, RoundOutcome, RunContext, platform_line_separator,
};
pub use round::{Declaration, Round};
pub use validate::CapabilityViolation;
