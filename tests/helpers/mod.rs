#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Directory holding the sample project.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/js-project")
}

/// Copy the sample project into a fresh temporary directory.
pub fn fixture_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    copy_tree(&fixture_dir(), dir.path());
    dir
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Read `root/rel` to a string.
pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", root.join(rel).display()))
}

pub const USER_DECLARATIONS: &str = "\
interface User {
  name: string;
}

declare function createUser(name: string, email: string, age: number): User;
";

pub const USER_SOURCE: &str = "\
function createUser(name, email, age) {
  return { name, email, age };
}
";
