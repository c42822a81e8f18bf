//! Copies marker fields into registration records.

use modev_data::ModuleEventReceiverData;

use crate::round::Declaration;

/// Builds the record for one validated declaration.
///
/// Field values are copied verbatim. A declaration without `marker` yields the
/// marker defaults; the scanner never hands such a declaration over.
pub fn extract(declaration: &Declaration, marker: &str, module_name: &str) -> ModuleEventReceiverData {
	let args = declaration.marker(marker).cloned().unwrap_or_default();
	ModuleEventReceiverData {
		module_name: module_name.to_owned(),
		class_qualified_name: declaration.qualified_name.clone(),
		group: args.group,
		priority: args.priority,
		flag: args.flag,
	}
}
