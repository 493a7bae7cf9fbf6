//! Shared test infrastructure for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SPEC_NAME: &str = "kmip-spec-enumerations-v2.1-os_enumerations.csv";
pub const STATE_REL: &str = "src/main/java/org/purpleBean/kmip/common/enumeration/State.java";
pub const KEY_WRAP_REL: &str =
    "src/main/java/org/purpleBean/kmip/common/enumeration/KeyWrapType.java";
pub const TAG_REL: &str = "src/main/java/org/purpleBean/kmip/KmipTag.java";

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

/// A scratch copy of the fixture project plus the specification table.
pub struct Project {
    pub temp: TempDir,
}

impl Project {
    pub fn new() -> anyhow::Result<Self> {
        let temp = TempDir::new()?;
        copy_tree(&data_dir().join("project"), temp.path())?;
        fs::copy(data_dir().join(SPEC_NAME), temp.path().join(SPEC_NAME))?;
        Ok(Self { temp })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).expect("read fixture file")
    }

    /// Run the binary from the project root.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_enumsync"))
            .args(args)
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("spawn enumsync")
    }

    /// Run `sync` against the bundled table and parse the JSON summary.
    pub fn sync(&self, extra: &[&str]) -> serde_json::Value {
        let mut args = vec!["sync", "--spec", SPEC_NAME];
        args.extend_from_slice(extra);
        let output = self.run(&args);
        assert!(
            output.status.success(),
            "sync failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("summary is JSON")
    }
}

fn copy_tree(src: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
