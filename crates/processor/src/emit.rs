//! Renders and persists the generated loader.

use modev_data::{GENERATED_MODULE, LOADER_TRAIT, MODULE_DATA_LOADER_PREFIX, ModuleEventReceiverData, RECEIVER_DATA};
use thiserror::Error;

use crate::host::{BuildContext, WriteError};

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
	/// Well-known module the file belongs to.
	pub package: String,
	pub type_name: String,
	pub content: String,
}

impl Artifact {
	pub fn file_name(&self) -> String {
		format!("{}.rs", self.type_name)
	}
}

/// The generated artifact could not be persisted. Not retried.
#[derive(Debug, Error)]
#[error("failed to write generated loader `{type_name}`: {source}")]
pub struct ArtifactWriteFailure {
	pub type_name: String,
	#[source]
	pub source: WriteError,
}

/// Name of the loader type generated for `module_name`.
pub fn loader_type_name(module_name: &str) -> String {
	format!("{MODULE_DATA_LOADER_PREFIX}{module_name}")
}

/// Renders the loader for `module_name` registering `descriptors` in order.
///
/// The loader's `load` appends one freshly built record per descriptor and
/// does nothing else. An empty slice renders a no-op body.
pub fn render(module_name: &str, descriptors: &[ModuleEventReceiverData], line_separator: &str) -> Artifact {
	let type_name = loader_type_name(module_name);

	let mut lines = vec![
		"// @generated by modev-processor. Do not edit.".to_owned(),
		String::new(),
		format!("/// Loads the module event receivers declared in module `{module_name}`."),
		"#[allow(non_camel_case_types)]".to_owned(),
		format!("pub struct {type_name};"),
		String::new(),
		format!("impl ::{LOADER_TRAIT} for {type_name} {{"),
		format!("\tfn load(&self, data_list: &mut ::std::vec::Vec<::{RECEIVER_DATA}>) {{"),
	];

	if descriptors.is_empty() {
		lines.push("\t\tlet _ = data_list;".to_owned());
	}
	for data in descriptors {
		lines.push(format!(
			"\t\tdata_list.push(::{RECEIVER_DATA}::new({:?}, {:?}, {:?}, {}, {}));",
			data.module_name, data.class_qualified_name, data.group, data.priority, data.flag
		));
	}

	lines.push("\t}".to_owned());
	lines.push("}".to_owned());
	lines.push(String::new());

	Artifact {
		package: GENERATED_MODULE.to_owned(),
		type_name,
		content: lines.join(line_separator),
	}
}

/// Hands `artifact` to the host's output sink.
pub fn emit<C>(host: &mut C, artifact: &Artifact) -> Result<(), ArtifactWriteFailure>
where
	C: BuildContext + ?Sized,
{
	host.write_artifact(&artifact.package, &artifact.type_name, &artifact.content)
		.map_err(|source| ArtifactWriteFailure {
			type_name: artifact.type_name.clone(),
			source,
		})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::testing::RecordingHost;

	#[test]
	fn renders_one_push_per_descriptor() {
		let artifact = render(
			"auth",
			&[ModuleEventReceiverData::new("auth", "com.x.Foo", "core", 1, 0)],
			"\n",
		);

		assert_eq!(artifact.package, "modev_generated");
		assert_eq!(artifact.type_name, "ModuleDataLoader_auth");
		assert_eq!(artifact.file_name(), "ModuleDataLoader_auth.rs");
		assert_eq!(
			artifact.content,
			"// @generated by modev-processor. Do not edit.\n\
			\n\
			/// Loads the module event receivers declared in module `auth`.\n\
			#[allow(non_camel_case_types)]\n\
			pub struct ModuleDataLoader_auth;\n\
			\n\
			impl ::modev_data::ModuleEventDataLoader for ModuleDataLoader_auth {\n\
			\tfn load(&self, data_list: &mut ::std::vec::Vec<::modev_data::ModuleEventReceiverData>) {\n\
			\t\tdata_list.push(::modev_data::ModuleEventReceiverData::new(\"auth\", \"com.x.Foo\", \"core\", 1, 0));\n\
			\t}\n\
			}\n"
		);
	}

	#[test]
	fn keeps_input_order() {
		let descriptors = [
			ModuleEventReceiverData::new("m", "m::Zeta", "", 0, 0),
			ModuleEventReceiverData::new("m", "m::Alpha", "", 0, 0),
		];
		let content = render("m", &descriptors, "\n").content;

		let zeta = content.find("m::Zeta").unwrap();
		let alpha = content.find("m::Alpha").unwrap();
		assert!(zeta < alpha);
		assert_eq!(content.matches("data_list.push(").count(), 2);
	}

	#[test]
	fn escapes_string_payloads() {
		let descriptors = [ModuleEventReceiverData::new("m", "m::Q", "say \"hi\"\\", -2, 3)];
		let content = render("m", &descriptors, "\n").content;
		assert!(content.contains(r#"::new("m", "m::Q", "say \"hi\"\\", -2, 3));"#));
	}

	#[test]
	fn empty_descriptors_render_noop_body() {
		let content = render("m", &[], "\n").content;
		assert!(content.contains("let _ = data_list;"));
		assert!(!content.contains("push("));
	}

	#[test]
	fn uses_configured_line_separator() {
		let content = render("m", &[], "\r\n").content;
		assert!(content.ends_with("}\r\n"));
		assert_eq!(content.matches('\n').count(), content.matches("\r\n").count());
	}

	#[test]
	fn emit_reports_write_failure() {
		let mut host = RecordingHost::new().failing_writes();
		let artifact = render("m", &[], "\n");

		let failure = emit(&mut host, &artifact).unwrap_err();
		assert_eq!(failure.type_name, "ModuleDataLoader_m");
		assert!(host.artifacts.is_empty());
	}

	#[test]
	fn emit_hands_artifact_to_host() {
		let mut host = RecordingHost::new();
		let artifact = render("m", &[], "\n");

		emit(&mut host, &artifact).unwrap();
		assert_eq!(host.artifacts, vec![artifact]);
	}
}
