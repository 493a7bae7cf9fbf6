//! Run summary.
//!
//! Built from the structured [`ChangeSet`]s after each category is processed;
//! serialized as JSON on stdout.
use crate::diff::{ChangeSet, EditDecision};
use crate::error::CategoryError;
use crate::spec_table::RowIssue;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Empty change set; nothing to write.
    NoChanges,
    /// Dry run found changes.
    Pending,
    Updated,
    /// Changes were found but the regenerated text matches the file.
    Unmodified,
    /// Category-level problem; the category had no usable data.
    Skipped,
    /// Write-time failure; the file was left untouched.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub status: CategoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_names: Vec<String>,
    /// Values whose constant reused an earlier name and was renamed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renamed_values: Vec<String>,
    pub needs_version_fixes: usize,
    pub identity_replacements: usize,
    pub added_constants: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategoryReport {
    pub fn from_changes(
        status: CategoryStatus,
        file: Option<String>,
        changes: &ChangeSet,
        hex_width: usize,
    ) -> Self {
        let hex = |value: &u32| format!("0x{value:0hex_width$X}");
        CategoryReport {
            status,
            file,
            missing_values: changes.missing.iter().map(hex).collect(),
            extra_values: changes.extra.iter().map(hex).collect(),
            duplicate_names: changes.duplicates.clone(),
            renamed_values: changes.name_clashes.iter().map(hex).collect(),
            needs_version_fixes: changes.count(EditDecision::AddTargetVersion)
                + changes.count(EditDecision::RemoveTargetVersion),
            identity_replacements: changes.count(EditDecision::ReplaceIdentity),
            added_constants: changes.missing.len(),
            error_kind: None,
            error: None,
        }
    }

    pub fn from_error(file: Option<String>, err: &CategoryError) -> Self {
        let status = if err.is_write_failure() {
            CategoryStatus::Failed
        } else {
            CategoryStatus::Skipped
        };
        CategoryReport {
            status,
            file,
            missing_values: Vec::new(),
            extra_values: Vec::new(),
            duplicate_names: Vec::new(),
            renamed_values: Vec::new(),
            needs_version_fixes: 0,
            identity_replacements: 0,
            added_constants: 0,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: &'static str,
    pub target_version: String,
    pub specification: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub row_issues: Vec<RowIssue>,
    pub categories: BTreeMap<String, CategoryReport>,
}

impl RunReport {
    pub fn count(&self, status: CategoryStatus) -> usize {
        self.categories
            .values()
            .filter(|report| report.status == status)
            .count()
    }
}
