//! Runtime types shared by module event receivers and the loaders generated for them.
//!
//! A crate marks its listeners with `#[module_event_receiver(...)]`. At build time
//! `modev-processor` discovers them and writes one `ModuleDataLoader_<module>` type
//! implementing [`ModuleEventDataLoader`], which the crate pulls in with
//! [`include_module_data_loader!`].

/// Prefix of every generated loader type; the module name is appended verbatim.
pub const MODULE_DATA_LOADER_PREFIX: &str = "ModuleDataLoader_";

/// Module (directory under `OUT_DIR`) that generated loaders are written to.
pub const GENERATED_MODULE: &str = "modev_generated";

/// Processor option carrying the owning module's name.
pub const KEY_MODULE_NAME: &str = "MODULE_NAME";

/// Name of the marker attribute selecting receivers.
pub const MARKER_NAME: &str = "module_event_receiver";

/// Fully qualified path of the capability every receiver must implement.
pub const LISTENER_TRAIT: &str = "modev_data::ModuleEventListener";

/// Fully qualified path of the trait generated loaders implement.
pub const LOADER_TRAIT: &str = "modev_data::ModuleEventDataLoader";

/// Fully qualified path of [`ModuleEventReceiverData`].
pub const RECEIVER_DATA: &str = "modev_data::ModuleEventReceiverData";

/// Metadata registered for one module event receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleEventReceiverData {
	/// Module the receiver was declared in.
	pub module_name: String,
	/// Fully qualified path of the receiver type.
	pub class_qualified_name: String,
	/// Free-form group tag.
	pub group: String,
	/// Opaque priority payload.
	pub priority: i32,
	/// Opaque flag bits.
	pub flag: i32,
}

impl ModuleEventReceiverData {
	pub fn new(
		module_name: impl Into<String>,
		class_qualified_name: impl Into<String>,
		group: impl Into<String>,
		priority: i32,
		flag: i32,
	) -> Self {
		Self {
			module_name: module_name.into(),
			class_qualified_name: class_qualified_name.into(),
			group: group.into(),
			priority,
			flag,
		}
	}
}

/// Capability required of every `#[module_event_receiver]` type.
pub trait ModuleEventListener {}

/// Implemented by the generated `ModuleDataLoader_<module>` types.
pub trait ModuleEventDataLoader {
	/// Appends one [`ModuleEventReceiverData`] per receiver of the module, in discovery order.
	fn load(&self, data_list: &mut Vec<ModuleEventReceiverData>);
}

/// Includes the loader generated for `$module` from `OUT_DIR`.
///
/// ```ignore
/// modev_data::include_module_data_loader!(auth);
///
/// let mut receivers = Vec::new();
/// ModuleDataLoader_auth.load(&mut receivers);
/// ```
#[macro_export]
macro_rules! include_module_data_loader {
	($module:ident) => {
		// Directory matches `GENERATED_MODULE`.
		include!(concat!(
			env!("OUT_DIR"),
			"/modev_generated/ModuleDataLoader_",
			stringify!($module),
			".rs"
		));
	};
}
