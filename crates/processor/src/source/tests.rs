use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use super::*;
use crate::host::TypeHandle;
use crate::marker::MarkerArgs;

const MARKER: &str = "module_event_receiver";
const CAP: &str = "modev_data::ModuleEventListener";

fn write(root: &Path, rel: &str, content: &str) {
	let path = root.join(rel);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, content).unwrap();
}

fn subtype(set: &SourceSet, ty: &str) -> bool {
	set.types.is_subtype(&TypeHandle::new(ty), &TypeHandle::new(CAP))
}

#[test]
fn module_paths_follow_file_layout() {
	let src = Path::new("/p/src");
	assert_eq!(module_path("app", src, &src.join("lib.rs")), ["app"]);
	assert_eq!(module_path("app", src, &src.join("main.rs")), ["app"]);
	assert_eq!(module_path("app", src, &src.join("a.rs")), ["app", "a"]);
	assert_eq!(module_path("app", src, &src.join("a/mod.rs")), ["app", "a"]);
	assert_eq!(module_path("app", src, &src.join("a/b.rs")), ["app", "a", "b"]);
	assert_eq!(module_path("app", src, &src.join("a/lib.rs")), ["app", "a", "lib"]);
}

#[test]
fn finds_marked_types_with_locations() {
	let dir = tempfile::tempdir().unwrap();
	write(
		dir.path(),
		"lib.rs",
		"mod listeners;\n\n#[module_event_receiver(group = \"core\", priority = 1)]\npub struct Root;\n\npub struct Plain;\n",
	);
	write(
		dir.path(),
		"listeners.rs",
		"#[modev_macros::module_event_receiver]\npub enum Session { A }\n\nfn unrelated() {}\n",
	);

	let set = load(dir.path(), "my-app", MARKER).unwrap();

	assert_eq!(set.files.len(), 2);
	let marked: Vec<_> = set.round.annotated_with(MARKER).collect();
	assert_eq!(marked.len(), 2);

	let root = marked.iter().find(|d| d.qualified_name == "my_app::Root").unwrap();
	assert_eq!(root.marker(MARKER), Some(&MarkerArgs::new("core", 1, 0)));
	let location = root.location.as_ref().unwrap();
	assert_eq!(location.line, 4);
	assert_eq!(location.column, 11);

	assert!(marked.iter().any(|d| d.qualified_name == "my_app::listeners::Session"));
	assert_eq!(set.round.declarations().len(), 2);
}

#[test]
fn resolves_trait_impls_through_imports_and_modules() {
	let dir = tempfile::tempdir().unwrap();
	write(
		dir.path(),
		"lib.rs",
		"use modev_data::ModuleEventListener;\n\
		 pub mod a;\n\
		 pub struct Imported;\n\
		 impl ModuleEventListener for Imported {}\n\
		 pub struct Qualified;\n\
		 impl ::modev_data::ModuleEventListener for Qualified {}\n\
		 pub struct Renamed;\n\
		 use modev_data::ModuleEventListener as Listener;\n\
		 impl Listener for Renamed {}\n\
		 impl modev_data::ModuleEventListener for a::Child {}\n\
		 mod inline {\n\
		 \tpub struct Nested;\n\
		 \timpl modev_data::ModuleEventListener for Nested {}\n\
		 \timpl modev_data::ModuleEventListener for super::Outer {}\n\
		 }\n\
		 pub struct Outer;\n\
		 pub struct Stranger;\n\
		 impl Clone for Stranger { fn clone(&self) -> Self { Stranger } }\n",
	);
	write(dir.path(), "a/mod.rs", "pub struct Child;\n");

	let set = load(dir.path(), "app", MARKER).unwrap();

	assert!(subtype(&set, "app::Imported"));
	assert!(subtype(&set, "app::Qualified"));
	assert!(subtype(&set, "app::Renamed"));
	assert!(subtype(&set, "app::a::Child"));
	assert!(subtype(&set, "app::inline::Nested"));
	assert!(subtype(&set, "app::Outer"));
	assert!(!subtype(&set, "app::Stranger"));
}

#[test]
fn glob_imported_trait_matches_by_name() {
	let dir = tempfile::tempdir().unwrap();
	write(
		dir.path(),
		"lib.rs",
		"use modev_data::*;\npub struct Foo;\nimpl ModuleEventListener for Foo {}\n",
	);

	let set = load(dir.path(), "app", MARKER).unwrap();
	assert!(subtype(&set, "app::Foo"));
}

#[test]
fn local_trait_with_capability_name_is_not_the_capability() {
	let dir = tempfile::tempdir().unwrap();
	write(
		dir.path(),
		"lib.rs",
		"pub trait ModuleEventListener {}\npub struct Foo;\nimpl ModuleEventListener for Foo {}\n",
	);

	let set = load(dir.path(), "app", MARKER).unwrap();
	assert!(!subtype(&set, "app::Foo"));
}

#[test]
fn reports_malformed_marker_with_position() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "lib.rs", "\n#[module_event_receiver(priority = \"high\")]\nstruct Bad;\n");

	let err = load(dir.path(), "app", MARKER).unwrap_err();
	let SourceError::Marker { line, .. } = &err else {
		panic!("expected a marker error, got {err}");
	};
	assert_eq!(*line, 2);
}

#[test]
fn reports_syntax_errors() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "lib.rs", "pub struct Broken {\n");

	assert!(matches!(load(dir.path(), "app", MARKER), Err(SourceError::Parse { .. })));
}

#[test]
fn missing_source_dir_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	assert!(matches!(
		load(&dir.path().join("nope"), "app", MARKER),
		Err(SourceError::Walk { .. })
	));
}
