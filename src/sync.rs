//! Category synchronization.
//!
//! One category at a time: resolve the file, extract the block, compute the
//! change set, regenerate, and either report or write. Failures stay local to
//! the category that raised them.
use crate::block::{extract_block, ExtractedBlock, HeaderMarker};
use crate::config::SyncConfig;
use crate::diff::{compute_changes, ChangeSet, SyncTarget};
use crate::error::CategoryError;
use crate::layout::Layout;
use crate::regen::{regenerate, splice};
use crate::report::{CategoryReport, CategoryStatus};
use crate::spec_table::SpecTable;
use crate::staging::{normalize_line_endings, publish_text};
use crate::version::TagScheme;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Synchronizer<'a> {
    config: &'a SyncConfig,
    layout: &'a Layout,
    table: &'a SpecTable,
    target: SyncTarget,
    marker: HeaderMarker,
}

impl<'a> Synchronizer<'a> {
    pub fn new(config: &'a SyncConfig, layout: &'a Layout, table: &'a SpecTable) -> Self {
        Synchronizer {
            config,
            layout,
            table,
            target: SyncTarget {
                target: table.target,
                scheme: TagScheme::new(&config.tag_namespace, &config.unknown_tag),
            },
            marker: HeaderMarker::from_config(config),
        }
    }

    /// Process every category in the table, in stem order.
    pub fn sync_all(&self, write: bool) -> BTreeMap<String, CategoryReport> {
        self.table
            .categories
            .keys()
            .map(|stem| (stem.clone(), self.sync_category(stem, write)))
            .collect()
    }

    pub fn sync_category(&self, stem: &str, write: bool) -> CategoryReport {
        let span = tracing::info_span!("category", category = %stem);
        let _guard = span.enter();

        let Some(path) = self.layout.resolve(stem) else {
            let err = CategoryError::FileNotFound(stem.to_string());
            tracing::warn!("{err}");
            return CategoryReport::from_error(None, &err);
        };
        let file = Some(path.display().to_string());
        match self.process(stem, &path, write) {
            Ok((status, changes)) => {
                CategoryReport::from_changes(status, file, &changes, self.config.hex_width(stem))
            }
            Err(err) => {
                if err.is_write_failure() {
                    tracing::error!("{err}");
                } else {
                    tracing::warn!("skipping: {err}");
                }
                CategoryReport::from_error(file, &err)
            }
        }
    }

    fn process(
        &self,
        stem: &str,
        path: &Path,
        write: bool,
    ) -> Result<(CategoryStatus, ChangeSet), CategoryError> {
        let empty = BTreeMap::new();
        let slice = self.table.slice(stem).unwrap_or(&empty);
        let original = read_source(path)?;
        let text = normalize_line_endings(&original);
        let block = extract_block(&text, &self.marker).map_err(|source| CategoryError::Block {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            constants = block.constants.len(),
            lines = block.region.lines().count(),
            "located block"
        );

        let changes = compute_changes(&block.constants, slice, &self.target);
        log_changes(&changes);
        if changes.is_empty() {
            tracing::info!("no changes");
            return Ok((CategoryStatus::NoChanges, changes));
        }

        let regenerated = regenerate(
            &block,
            slice,
            &changes,
            &self.target,
            self.config.hex_width(stem),
        );
        if !write {
            tracing::info!(
                missing = changes.missing.len(),
                extra = changes.extra.len(),
                edits = changes.edits.len(),
                "changes pending"
            );
            return Ok((CategoryStatus::Pending, changes));
        }
        if regenerated.text == original {
            tracing::info!("file already matches regenerated block");
            return Ok((CategoryStatus::Unmodified, changes));
        }

        self.write_region(path, &block, &regenerated.region)?;
        tracing::info!(
            path = %path.display(),
            constants = regenerated.constants.len(),
            "updated"
        );
        Ok((CategoryStatus::Updated, changes))
    }

    /// Re-read the file and re-locate the block before replacing it; bail if
    /// the text around the region is no longer what the plan was built from.
    fn write_region(
        &self,
        path: &Path,
        planned: &ExtractedBlock,
        region: &str,
    ) -> Result<(), CategoryError> {
        let current = normalize_line_endings(&read_source(path)?);
        let structural = || CategoryError::Structural {
            path: path.to_path_buf(),
        };
        let fresh = extract_block(&current, &self.marker).map_err(|_| structural())?;
        if fresh.prefix != planned.prefix || fresh.suffix != planned.suffix {
            return Err(structural());
        }
        let text = splice(&fresh.prefix, region, &fresh.suffix);
        publish_text(path, &text).map_err(|source| CategoryError::Io {
            action: "write",
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_source(path: &Path) -> Result<String, CategoryError> {
    fs::read_to_string(path).map_err(|source| CategoryError::Io {
        action: "read",
        path: PathBuf::from(path),
        source,
    })
}

fn log_changes(changes: &ChangeSet) {
    for value in &changes.missing {
        tracing::debug!(value = %format!("0x{value:08X}"), "missing from source");
    }
    for value in &changes.extra {
        tracing::debug!(value = %format!("0x{value:08X}"), "not in specification");
    }
    for (value, decision) in &changes.edits {
        tracing::debug!(value = %format!("0x{value:08X}"), ?decision, "edit");
    }
    for name in &changes.duplicates {
        tracing::warn!(constant = %name, "duplicate value dropped");
    }
    for value in &changes.name_clashes {
        tracing::warn!(value = %format!("0x{value:08X}"), "name already used, renaming");
    }
}
