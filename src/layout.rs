//! Category to source file resolution.
use crate::config::SyncConfig;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Layout {
    enum_dir: PathBuf,
    fallback_dir: PathBuf,
    special_paths: BTreeMap<String, PathBuf>,
    extension: String,
}

impl Layout {
    /// `enum_dir` overrides the configured directory; it is taken as given
    /// rather than joined to `root`.
    pub fn new(root: &Path, enum_dir: Option<&Path>, config: &SyncConfig) -> Self {
        let enum_dir = enum_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(&config.enum_dir));
        let special_paths = config
            .special_paths
            .iter()
            .map(|(stem, rel)| (stem.clone(), root.join(rel)))
            .collect();
        Layout {
            enum_dir,
            fallback_dir: root.join(&config.fallback_dir),
            special_paths,
            extension: config.source_extension.clone(),
        }
    }

    pub fn enum_dir(&self) -> &Path {
        &self.enum_dir
    }

    /// The enum directory must exist and hold at least one entry.
    pub fn ensure_enum_dir(&self) -> Result<()> {
        let mut entries = fs::read_dir(&self.enum_dir)
            .with_context(|| format!("enum directory not found: {}", self.enum_dir.display()))?;
        if entries.next().is_none() {
            return Err(anyhow!(
                "enum directory is empty: {}",
                self.enum_dir.display()
            ));
        }
        Ok(())
    }

    /// Special paths first, then the enum directory, then the fallback directory.
    pub fn resolve(&self, stem: &str) -> Option<PathBuf> {
        if let Some(path) = self.special_paths.get(stem).filter(|path| path.is_file()) {
            return Some(path.clone());
        }
        let file_name = format!("{stem}.{}", self.extension);
        [&self.enum_dir, &self.fallback_dir]
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }
}
