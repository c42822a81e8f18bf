//! Arguments of the `#[module_event_receiver(...)]` marker.
//!
//! Shared by the attribute macro, which rejects malformed markers at compile
//! time, and by the source scanner, which reads the same fields back.
//!
//! ```ignore
//! #[module_event_receiver(group = "core", priority = 1, flag = 0b10)]
//! pub struct SessionListener;
//! ```
//!
//! Every field is optional: `group` defaults to `""`, `priority` and `flag` to `0`.

use proc_macro2::TokenStream;
use syn::meta::ParseNestedMeta;
use syn::parse::Parser;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, LitStr, UnOp};

/// Field values of one marker instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkerArgs {
	pub group: String,
	pub priority: i32,
	pub flag: i32,
}

impl MarkerArgs {
	pub fn new(group: impl Into<String>, priority: i32, flag: i32) -> Self {
		Self {
			group: group.into(),
			priority,
			flag,
		}
	}

	/// Parses the arguments of a marker attribute found on an item.
	///
	/// A bare `#[module_event_receiver]` yields the defaults.
	pub fn from_attribute(attr: &Attribute) -> syn::Result<Self> {
		let mut args = FieldParser::default();
		if matches!(attr.meta, syn::Meta::Path(_)) {
			return Ok(args.finish());
		}
		attr.parse_nested_meta(|meta| args.field(meta))?;
		Ok(args.finish())
	}

	/// Parses the argument tokens handed to the attribute macro.
	pub fn from_tokens(tokens: TokenStream) -> syn::Result<Self> {
		let mut args = FieldParser::default();
		syn::meta::parser(|meta| args.field(meta)).parse2(tokens)?;
		Ok(args.finish())
	}
}

/// Whether `attr` is the marker, either bare or path-qualified.
pub fn is_marker(attr: &Attribute, marker: &str) -> bool {
	attr.path().segments.last().is_some_and(|seg| seg.ident == marker)
}

#[derive(Default)]
struct FieldParser {
	group: Option<String>,
	priority: Option<i32>,
	flag: Option<i32>,
}

impl FieldParser {
	fn field(&mut self, meta: ParseNestedMeta<'_>) -> syn::Result<()> {
		if meta.path.is_ident("group") {
			if self.group.is_some() {
				return Err(meta.error("duplicate `group` argument"));
			}
			let value: LitStr = meta.value()?.parse()?;
			self.group = Some(value.value());
		} else if meta.path.is_ident("priority") {
			if self.priority.is_some() {
				return Err(meta.error("duplicate `priority` argument"));
			}
			self.priority = Some(parse_i32(&meta)?);
		} else if meta.path.is_ident("flag") {
			if self.flag.is_some() {
				return Err(meta.error("duplicate `flag` argument"));
			}
			self.flag = Some(parse_i32(&meta)?);
		} else {
			return Err(meta.error("unknown module_event_receiver argument; expected `group`, `priority` or `flag`"));
		}
		Ok(())
	}

	fn finish(self) -> MarkerArgs {
		MarkerArgs {
			group: self.group.unwrap_or_default(),
			priority: self.priority.unwrap_or(0),
			flag: self.flag.unwrap_or(0),
		}
	}
}

/// Accepts an integer literal, optionally negated.
fn parse_i32(meta: &ParseNestedMeta<'_>) -> syn::Result<i32> {
	let expr: Expr = meta.value()?.parse()?;
	match &expr {
		Expr::Lit(ExprLit { lit: Lit::Int(lit), .. }) => lit.base10_parse(),
		Expr::Unary(ExprUnary {
			op: UnOp::Neg(_),
			expr: inner,
			..
		}) => match inner.as_ref() {
			Expr::Lit(ExprLit { lit: Lit::Int(lit), .. }) => format!("-{}", lit.base10_digits())
				.parse::<i32>()
				.map_err(|e| syn::Error::new_spanned(&expr, e)),
			_ => Err(syn::Error::new_spanned(&expr, "expected an integer literal")),
		},
		_ => Err(syn::Error::new_spanned(&expr, "expected an integer literal")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(src: &str) -> TokenStream {
		src.parse().expect("test tokens should lex")
	}

	fn attr(src: &str) -> Attribute {
		let item: syn::ItemStruct = syn::parse_str(&format!("{src} struct S;")).expect("test item should parse");
		item.attrs.into_iter().next().expect("test item should carry an attribute")
	}

	#[test]
	fn parses_all_fields() {
		let args = MarkerArgs::from_tokens(tokens(r#"group = "core", priority = 1, flag = 0"#)).unwrap();
		assert_eq!(args, MarkerArgs::new("core", 1, 0));
	}

	#[test]
	fn missing_fields_take_defaults() {
		let args = MarkerArgs::from_tokens(tokens("priority = 7")).unwrap();
		assert_eq!(args, MarkerArgs::new("", 7, 0));
		assert_eq!(MarkerArgs::from_tokens(TokenStream::new()).unwrap(), MarkerArgs::default());
	}

	#[test]
	fn accepts_negative_and_binary_literals() {
		let args = MarkerArgs::from_tokens(tokens("priority = -5, flag = 0b101")).unwrap();
		assert_eq!(args.priority, -5);
		assert_eq!(args.flag, 5);
	}

	#[test]
	fn rejects_unknown_duplicate_and_mistyped_fields() {
		assert!(MarkerArgs::from_tokens(tokens(r#"name = "x""#)).is_err());
		assert!(MarkerArgs::from_tokens(tokens("flag = 1, flag = 2")).is_err());
		assert!(MarkerArgs::from_tokens(tokens("group = 3")).is_err());
		assert!(MarkerArgs::from_tokens(tokens(r#"priority = "high""#)).is_err());
		assert!(MarkerArgs::from_tokens(tokens("priority = 3000000000")).is_err());
	}

	#[test]
	fn reads_attribute_forms() {
		let bare = attr("#[module_event_receiver]");
		assert_eq!(MarkerArgs::from_attribute(&bare).unwrap(), MarkerArgs::default());

		let qualified = attr(r#"#[modev_macros::module_event_receiver(group = "ui")]"#);
		assert!(is_marker(&qualified, "module_event_receiver"));
		assert_eq!(MarkerArgs::from_attribute(&qualified).unwrap().group, "ui");

		let other = attr("#[derive(Debug)]");
		assert!(!is_marker(&other, "module_event_receiver"));
	}
}
