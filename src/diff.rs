//! Change computation between a parsed block and a specification slice.
//!
//! Pure: no I/O and no logging. The orchestrator reports what this decides.
use crate::block::Constant;
use crate::naming::{is_derived_from, is_placeholder_text, is_reserved_text, upper_snake_case};
use crate::version::{TagScheme, VersionTag};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditDecision {
    /// Rename and relabel a placeholder from the specification name.
    ReplaceIdentity,
    AddTargetVersion,
    RemoveTargetVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub missing: Vec<u32>,
    pub extra: Vec<u32>,
    /// Keyed by value; reserved and collapsed duplicates never get an entry.
    pub edits: BTreeMap<u32, EditDecision>,
    /// Later non-reserved constants repeating an earlier value.
    pub duplicates: Vec<String>,
    /// Values of later non-reserved constants reusing an earlier name; they
    /// are renamed on regeneration.
    pub name_clashes: Vec<u32>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
            && self.extra.is_empty()
            && self.edits.is_empty()
            && self.duplicates.is_empty()
            && self.name_clashes.is_empty()
    }

    pub fn count(&self, decision: EditDecision) -> usize {
        self.edits.values().filter(|edit| **edit == decision).count()
    }
}

/// Target version and tag scheme shared by the diff and regeneration steps.
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub target: VersionTag,
    pub scheme: TagScheme,
}

/// A placeholder is only replaced when the specification offers a real name
/// that would actually change the constant.
pub fn replacement_name(constant: &Constant, spec_name: Option<&String>) -> Option<String> {
    if constant.is_reserved() {
        return None;
    }
    if !is_placeholder_text(&constant.name) && !is_placeholder_text(&constant.label) {
        return None;
    }
    let spec_name = spec_name.filter(|name| !is_reserved_text(name))?;
    let base = upper_snake_case(spec_name);
    if is_derived_from(&constant.name, &base) {
        return None;
    }
    Some(base)
}

pub fn compute_changes(
    constants: &[Constant],
    slice: &BTreeMap<u32, String>,
    target: &SyncTarget,
) -> ChangeSet {
    let existing: BTreeSet<u32> = constants.iter().map(|constant| constant.value).collect();

    let missing = slice
        .iter()
        .filter(|(value, name)| !existing.contains(*value) && !is_reserved_text(name))
        .map(|(value, _)| *value)
        .collect();
    let extra = existing
        .iter()
        .filter(|value| !slice.contains_key(*value))
        .copied()
        .collect();

    let mut edits = BTreeMap::new();
    let mut duplicates = Vec::new();
    let mut name_clashes = Vec::new();
    let mut seen_values = BTreeSet::new();
    let mut seen_names = BTreeSet::new();
    for constant in constants {
        if constant.is_reserved() {
            seen_names.insert(constant.name.as_str());
            continue;
        }
        if !seen_values.insert(constant.value) {
            duplicates.push(constant.name.clone());
            continue;
        }
        if !seen_names.insert(constant.name.as_str()) {
            name_clashes.push(constant.value);
        }
        if let Some(decision) = decide(constant, slice, target) {
            edits.insert(constant.value, decision);
        }
    }

    ChangeSet {
        missing,
        extra,
        edits,
        duplicates,
        name_clashes,
    }
}

fn decide(
    constant: &Constant,
    slice: &BTreeMap<u32, String>,
    target: &SyncTarget,
) -> Option<EditDecision> {
    let spec_name = slice.get(&constant.value);
    if replacement_name(constant, spec_name).is_some() {
        return Some(EditDecision::ReplaceIdentity);
    }
    let has_target = target.scheme.list_contains(&constant.versions, target.target);
    if spec_name.is_some() {
        let has_unknown = target
            .scheme
            .list_contains(&constant.versions, VersionTag::Unknown);
        if !has_unknown || !has_target {
            return Some(EditDecision::AddTargetVersion);
        }
        return None;
    }
    if has_target {
        return Some(EditDecision::RemoveTargetVersion);
    }
    None
}
