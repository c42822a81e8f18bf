//! Example crate registering its listeners through a generated loader.

use modev_data::{ModuleEventDataLoader, ModuleEventListener, ModuleEventReceiverData};
use modev_macros::module_event_receiver;

pub mod session;

#[module_event_receiver(group = "core", priority = 1)]
pub struct AuthListener;

impl ModuleEventListener for AuthListener {}

modev_data::include_module_data_loader!(demo);

/// Every receiver declared in this crate.
pub fn receivers() -> Vec<ModuleEventReceiverData> {
	let mut list = Vec::new();
	ModuleDataLoader_demo.load(&mut list);
	list
}
