//! Marker attribute implementation.

use modev_processor::MarkerArgs;
use proc_macro2::TokenStream;
use quote::quote;
use syn::Item;

/// Validates the marker arguments and returns `item` untouched.
pub fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
	MarkerArgs::from_tokens(attr)?;

	let item: Item = syn::parse2(item)?;
	match &item {
		Item::Struct(_) | Item::Enum(_) | Item::Union(_) => Ok(quote! { #item }),
		_ => Err(syn::Error::new_spanned(
			&item,
			"#[module_event_receiver] can only be applied to structs, enums or unions",
		)),
	}
}
