//! Specification table loading.
//!
//! The table is a CSV of `(category, name, value)` rows. Rows that cannot be
//! used are skipped and recorded as [`RowIssue`]s; only an unreadable file or
//! missing columns abort the load.
use crate::config::SyncConfig;
use crate::naming::category_to_stem;
use crate::version::VersionTag;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const CATEGORY_COLUMN: &str = "enumeration_category";
pub const NAME_COLUMN: &str = "enumeration_name";
pub const VALUE_COLUMN: &str = "value";

#[derive(Debug, Deserialize)]
struct SpecRow {
    enumeration_category: String,
    enumeration_name: String,
    value: String,
}

/// Values for one file stem, merged from every category that maps to it.
#[derive(Debug, Clone, Default)]
pub struct CategorySpec {
    pub categories: Vec<String>,
    pub values: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssueKind {
    Malformed,
    InvalidHex,
    Unmapped,
    Duplicate,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowIssue {
    pub line: u64,
    pub kind: RowIssueKind,
    pub detail: String,
}

#[derive(Debug)]
pub struct SpecTable {
    pub source: PathBuf,
    pub target: VersionTag,
    pub categories: BTreeMap<String, CategorySpec>,
    pub issues: Vec<RowIssue>,
}

impl SpecTable {
    pub fn slice(&self, stem: &str) -> Option<&BTreeMap<u32, String>> {
        self.categories.get(stem).map(|spec| &spec.values)
    }

    /// Find the stem for a user-supplied selector: a stem, a file name, or a category name.
    pub fn resolve_selector(&self, selector: &str, config: &SyncConfig) -> Option<String> {
        let trimmed = selector.trim();
        let file_stem = Path::new(trimmed)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(trimmed);
        if self.categories.contains_key(file_stem) {
            return Some(file_stem.to_string());
        }
        category_to_stem(trimmed, config).filter(|stem| self.categories.contains_key(stem))
    }
}

/// Derive the target version from a file name such as `enumerations-v2.1-os.csv`.
pub fn target_version_from_path(path: &Path) -> Result<VersionTag> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("specification path has no file name: {}", path.display()))?;
    let re = Regex::new(r"v(\d+)\.(\d+)").expect("static regex");
    let caps = re
        .captures(name)
        .ok_or_else(|| anyhow!("could not extract version from filename: {name}"))?;
    let revision = format!("{}.{}", &caps[1], &caps[2]);
    VersionTag::from_revision(&revision)
        .ok_or_else(|| anyhow!("version {revision} in {name} is out of range"))
}

pub fn load_spec_table(path: &Path, config: &SyncConfig) -> Result<SpecTable> {
    if !path.is_file() {
        return Err(anyhow!("specification file not found: {}", path.display()));
    }
    let target = target_version_from_path(path)?;
    let file =
        std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let (categories, issues) = parse_spec_rows(file, config)
        .with_context(|| format!("parse specification {}", path.display()))?;
    for issue in &issues {
        tracing::warn!(line = issue.line, kind = ?issue.kind, "{}", issue.detail);
    }
    if categories.is_empty() {
        tracing::warn!(path = %path.display(), "no valid enumeration data found");
    }
    Ok(SpecTable {
        source: path.to_path_buf(),
        target,
        categories,
        issues,
    })
}

/// Parse CSV rows into per-stem value maps. The first name seen for a
/// `(stem, value)` pair wins; later ones are recorded as duplicates.
pub fn parse_spec_rows<R: Read>(
    reader: R,
    config: &SyncConfig,
) -> Result<(BTreeMap<String, CategorySpec>, Vec<RowIssue>)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers().context("read CSV header")?.clone();
    let missing: Vec<&str> = [CATEGORY_COLUMN, NAME_COLUMN, VALUE_COLUMN]
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!(
            "CSV is missing required columns: {} (expected {CATEGORY_COLUMN}, {NAME_COLUMN}, {VALUE_COLUMN})",
            missing.join(", ")
        ));
    }

    let mut categories: BTreeMap<String, CategorySpec> = BTreeMap::new();
    let mut issues = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        match csv_reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) if err.is_io_error() => return Err(err).context("read CSV row"),
            Err(err) => {
                issues.push(RowIssue {
                    line: err.position().map(|pos| pos.line()).unwrap_or(0),
                    kind: RowIssueKind::Malformed,
                    detail: format!("malformed row: {err}"),
                });
                continue;
            }
        }
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let row: SpecRow = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(err) => {
                issues.push(RowIssue {
                    line,
                    kind: RowIssueKind::Malformed,
                    detail: format!("malformed row: {err}"),
                });
                continue;
            }
        };

        if is_extension_range(&row.value) {
            continue;
        }
        let value = match parse_hex_value(&row.value) {
            Some(value) => value,
            None => {
                issues.push(RowIssue {
                    line,
                    kind: RowIssueKind::InvalidHex,
                    detail: format!("invalid hex value {:?}", row.value),
                });
                continue;
            }
        };
        let Some(stem) = category_to_stem(&row.enumeration_category, config) else {
            if config
                .ignored_categories
                .iter()
                .all(|ignored| ignored != &row.enumeration_category)
            {
                issues.push(RowIssue {
                    line,
                    kind: RowIssueKind::Unmapped,
                    detail: format!("category {:?} has no file stem", row.enumeration_category),
                });
            } else {
                tracing::debug!(category = %row.enumeration_category, "ignored category");
            }
            continue;
        };

        let spec = categories.entry(stem.clone()).or_default();
        if !spec.categories.contains(&row.enumeration_category) {
            spec.categories.push(row.enumeration_category.clone());
        }
        match spec.values.entry(value) {
            Entry::Vacant(slot) => {
                slot.insert(row.enumeration_name);
            }
            Entry::Occupied(existing) if existing.get() != &row.enumeration_name => {
                issues.push(RowIssue {
                    line,
                    kind: RowIssueKind::Duplicate,
                    detail: format!(
                        "{stem} 0x{value:08X}: keeping {:?}, ignoring {:?}",
                        existing.get(),
                        row.enumeration_name
                    ),
                });
            }
            Entry::Occupied(_) => {}
        }
    }
    Ok((categories, issues))
}

/// Empty values and `8XXXXXXX`-style extension ranges carry no concrete value.
fn is_extension_range(raw: &str) -> bool {
    raw.is_empty() || raw.contains("XXXXXXX") || raw.matches('X').count() > 1
}

fn parse_hex_value(raw: &str) -> Option<u32> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
