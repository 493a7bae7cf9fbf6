//! Block regeneration.
//!
//! Applies a [`ChangeSet`] to the extracted constants, sorts by value, and
//! splices the formatted region back between the untouched prefix and suffix.
use crate::block::{Constant, ExtractedBlock};
use crate::diff::{replacement_name, ChangeSet, EditDecision, SyncTarget};
use crate::naming::{is_reserved_text, pascal_case, unique_name, upper_snake_case};
use crate::version::{normalize, VersionTag};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regenerated {
    pub constants: Vec<Constant>,
    pub region: String,
    pub text: String,
}

pub fn regenerate(
    block: &ExtractedBlock,
    slice: &BTreeMap<u32, String>,
    changes: &ChangeSet,
    target: &SyncTarget,
    hex_width: usize,
) -> Regenerated {
    let kept = collapse_duplicates(&block.constants);

    let clashing: BTreeSet<u32> = changes.name_clashes.iter().copied().collect();
    let keeps_name = |constant: &Constant| {
        constant.is_reserved()
            || (!clashing.contains(&constant.value)
                && changes.edits.get(&constant.value) != Some(&EditDecision::ReplaceIdentity))
    };
    let mut taken: BTreeSet<String> = kept
        .iter()
        .filter(|constant| keeps_name(constant))
        .map(|constant| constant.name.clone())
        .collect();

    let mut constants = Vec::with_capacity(kept.len() + changes.missing.len());
    for constant in kept {
        let decision = changes.edits.get(&constant.value);
        let mut updated = match decision {
            _ if constant.is_reserved() => constant.clone(),
            Some(EditDecision::ReplaceIdentity) => {
                match replacement_name(constant, slice.get(&constant.value)) {
                    Some(base) => {
                        let name = unique_name(&base, |candidate| taken.contains(candidate));
                        taken.insert(name.clone());
                        Constant {
                            name,
                            value: constant.value,
                            label: pascal_case(&base),
                            versions: retag(&constant.versions, true, target),
                        }
                    }
                    None => {
                        taken.insert(constant.name.clone());
                        Constant {
                            versions: retag(&constant.versions, true, target),
                            ..constant.clone()
                        }
                    }
                }
            }
            Some(EditDecision::AddTargetVersion) => Constant {
                versions: retag(&constant.versions, true, target),
                ..constant.clone()
            },
            Some(EditDecision::RemoveTargetVersion) => Constant {
                versions: retag(&constant.versions, false, target),
                ..constant.clone()
            },
            None => constant.clone(),
        };
        if !keeps_name(constant) && decision != Some(&EditDecision::ReplaceIdentity) {
            updated.name = unique_name(&constant.name, |candidate| taken.contains(candidate));
            taken.insert(updated.name.clone());
        }
        constants.push(updated);
    }

    for value in &changes.missing {
        let Some(spec_name) = slice.get(value).filter(|name| !is_reserved_text(name)) else {
            continue;
        };
        let base = upper_snake_case(spec_name);
        let name = unique_name(&base, |candidate| taken.contains(candidate));
        taken.insert(name.clone());
        constants.push(Constant {
            name,
            value: *value,
            label: pascal_case(&base),
            versions: [VersionTag::Unknown, target.target]
                .into_iter()
                .map(|tag| target.scheme.render(tag))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    constants.sort_by_key(|constant| constant.value);

    let region = render_region(&constants, hex_width, &block.indent);
    let text = splice(&block.prefix, &region, &block.suffix);
    Regenerated {
        constants,
        region,
        text,
    }
}

/// Keep reserved constants and the first non-reserved constant per value.
fn collapse_duplicates(constants: &[Constant]) -> Vec<&Constant> {
    let mut seen = BTreeSet::new();
    constants
        .iter()
        .filter(|constant| constant.is_reserved() || seen.insert(constant.value))
        .collect()
}

fn retag(versions: &str, ensure_target: bool, target: &SyncTarget) -> String {
    let tokens = target.scheme.split_list(versions);
    normalize(&tokens, ensure_target, target.target, &target.scheme).join(", ")
}

pub fn format_constant(constant: &Constant, hex_width: usize, indent: &str, last: bool) -> String {
    format!(
        "{indent}{}(0x{:0width$X}, \"{}\", {}){}",
        constant.name,
        constant.value,
        constant.label,
        constant.versions,
        if last { ';' } else { ',' },
        width = hex_width
    )
}

pub fn render_region(constants: &[Constant], hex_width: usize, indent: &str) -> String {
    let mut out = String::new();
    for (idx, constant) in constants.iter().enumerate() {
        let last = idx + 1 == constants.len();
        out.push_str(&format_constant(constant, hex_width, indent, last));
        out.push('\n');
    }
    out
}

pub fn splice(prefix: &str, region: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + region.len() + suffix.len());
    out.push_str(prefix);
    out.push_str(region);
    out.push_str(suffix);
    out
}

#[cfg(test)]
#[path = "regen_tests.rs"]
mod tests;
