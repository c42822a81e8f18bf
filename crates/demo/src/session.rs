use modev_data::ModuleEventListener;
use modev_macros::module_event_receiver;

#[module_event_receiver(group = "session", priority = -2, flag = 0b11)]
pub enum SessionListener {
	Primary,
}

impl ModuleEventListener for SessionListener {}
