//! Workspace manifests: shared version and members wired to the workspace
//! dependency table.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap()
        .to_path_buf()
}

fn manifest(path: &Path) -> toml::Value {
    let text = std::fs::read_to_string(path.join("Cargo.toml")).unwrap();
    text.parse().unwrap()
}

#[test]
fn members_inherit_workspace_version() {
    let root = workspace_root();
    let ws = manifest(&root);
    let members = ws["workspace"]["members"].as_array().unwrap();
    assert!(!members.is_empty());

    for member in members {
        let member = member.as_str().unwrap();
        let doc = manifest(&root.join(member));
        let inherited = doc["package"]["version"]
            .as_table()
            .and_then(|t| t.get("workspace"))
            .and_then(toml::Value::as_bool);
        assert_eq!(inherited, Some(true), "{member} should use version.workspace = true");
    }
}

#[test]
fn workspace_version_matches_library_version() {
    let ws = manifest(&workspace_root());
    let version = ws["workspace"]["package"]["version"].as_str().unwrap();
    assert_eq!(version, crisiswatch_core::VERSION);
    assert_eq!(version, env!("CARGO_PKG_VERSION"));
}
