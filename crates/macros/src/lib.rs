//! Procedural macros for modev.
//!
//! Provides the `#[module_event_receiver]` marker read by `modev-processor`.

use proc_macro::TokenStream;

mod receiver;

/// Marks a type for registration in its module's generated loader.
///
/// ```ignore
/// #[module_event_receiver(group = "session", priority = 10, flag = 0b01)]
/// pub struct SessionListener;
///
/// impl modev_data::ModuleEventListener for SessionListener {}
/// ```
///
/// # Attributes
///
/// - `group = "..."` - Optional: free-form group tag (default `""`)
/// - `priority = N` - Optional: `i32` priority payload (default 0)
/// - `flag = N` - Optional: `i32` flag bits (default 0)
///
/// The item is passed through unchanged. Only structs, enums and unions may be
/// marked; the type must implement `modev_data::ModuleEventListener`, which
/// the processor checks when generating the loader.
#[proc_macro_attribute]
pub fn module_event_receiver(attr: TokenStream, item: TokenStream) -> TokenStream {
	receiver::expand(attr.into(), item.into())
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}
