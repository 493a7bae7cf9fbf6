//! Naming transforms.
//!
//! Pure `&str -> String` functions. Category names consult the config's
//! override and ignore tables before the general transform.
use crate::config::SyncConfig;
use regex::Regex;
use std::sync::OnceLock;

const RESERVED_MARKER: &str = "reserved";
const PLACEHOLDER_MARKERS: [&str; 2] = ["reserve", "placeholder"];

fn non_alnum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("static regex"))
}

fn lower_upper_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z])([A-Z])").expect("static regex"))
}

fn acronym_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z])([A-Z][a-z])").expect("static regex"))
}

/// Map a specification category to its file stem, or `None` when the category
/// is ignored or has no usable characters.
pub fn category_to_stem(category: &str, config: &SyncConfig) -> Option<String> {
    let category = category.trim();
    if config
        .ignored_categories
        .iter()
        .any(|ignored| ignored == category)
    {
        return None;
    }
    if let Some(stem) = config.category_overrides.get(category) {
        return Some(stem.clone());
    }

    let stem: String = non_alnum_re()
        .split(category)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            if config.acronyms.iter().any(|acronym| acronym == &lower) {
                word.to_ascii_uppercase()
            } else {
                capitalize(&lower)
            }
        })
        .collect();
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// `KeyWrapType`, `key wrap-type` and `Key Wrap Type` all become `KEY_WRAP_TYPE`.
pub fn upper_snake_case(name: &str) -> String {
    let split = lower_upper_re().replace_all(name, "${1}_${2}");
    let split = acronym_word_re().replace_all(&split, "${1}_${2}");
    let joined = non_alnum_re().replace_all(&split, "_");
    let trimmed = joined.trim_matches('_').to_ascii_uppercase();
    if trimmed.is_empty() {
        "VAL".to_string()
    } else {
        trimmed
    }
}

pub fn pascal_case(upper_snake: &str) -> String {
    upper_snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| capitalize(&part.to_ascii_lowercase()))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_reserved_text(text: &str) -> bool {
    text.to_lowercase().contains(RESERVED_MARKER)
}

pub fn is_placeholder_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Pick `base`, or `base_2`, `base_3`, ... until `taken` rejects none.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}_{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// True when `name` is `base` or a collision-suffixed form of it.
pub fn is_derived_from(name: &str, base: &str) -> bool {
    if name == base {
        return true;
    }
    name.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
}
