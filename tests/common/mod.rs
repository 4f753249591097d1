//! Common test utilities and helpers
//!
//! Shared scaffolding for integration tests: scratch recipe folders and a
//! stub conda executable.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch folder of recipes
pub struct TestRecipes {
    /// Temporary directory holding the recipe folders
    pub dir: TempDir,
}

impl TestRecipes {
    /// Create an empty recipes folder
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path to the recipes folder
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Add one recipe folder with the given requirement lists
    pub fn add_recipe(&self, name: &str, build: &[&str], run: &[&str], test: &[&str]) {
        let folder = self.dir.path().join(name);
        std::fs::create_dir_all(&folder).expect("Failed to create recipe folder");
        let toml = format!(
            "[package]\nname = \"{name}\"\n\n[requirements]\n\
             build = {build:?}\nrun = {run:?}\ntest = {test:?}\n"
        );
        std::fs::write(folder.join("recipe.toml"), toml).expect("Failed to write recipe.toml");
    }
}

impl Default for TestRecipes {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a stub conda executable into `dir` and return its path.
///
/// With `--output` the stub prints a deterministic artifact path of the form
/// `/tmp/conda-bld/linux-64/<recipe>-1.0-py<py>_np<npy>.tar.bz2`; without it
/// the stub "builds", exiting with `$STUB_BUILD_EXIT` (default 0). When
/// `$STUB_BUILD_PID_FILE` is set the build instead records its pid there and
/// sleeps, standing in for a long-running build.
pub fn write_stub_conda(dir: &std::path::Path) -> PathBuf {
    let stub = dir.join("conda-stub");
    let script = r#"#!/bin/sh
# Test stub mimicking `conda build` just enough for buildmatrix.
recipe=$2
name=$(basename "$recipe")
py=""
npy=""
out=0
prev=""
for arg in "$@"; do
    case "$prev" in
        --python) py=$arg ;;
        --numpy) npy=$arg ;;
    esac
    if [ "$arg" = "--output" ]; then
        out=1
    fi
    prev=$arg
done
if [ "$out" = 1 ]; then
    echo "/tmp/conda-bld/linux-64/${name}-1.0-py${py}_np${npy}.tar.bz2"
elif [ -n "${STUB_BUILD_PID_FILE:-}" ]; then
    echo "$$" > "$STUB_BUILD_PID_FILE"
    exec sleep 60
else
    exit "${STUB_BUILD_EXIT:-0}"
fi
"#;
    std::fs::write(&stub, script).expect("Failed to write conda stub");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to mark conda stub executable");
    }
    stub
}
