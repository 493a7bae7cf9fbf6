//! Tool configuration.
//!
//! Every field has a default matching the KMIP code base this tool was built
//! for, so a config file only needs to name what differs.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_ENUM_DIR: &str = "src/main/java/org/purpleBean/kmip/common/enumeration";
pub const DEFAULT_FALLBACK_DIR: &str = "src/main/java/org/purpleBean/kmip";
pub const DEFAULT_HEX_WIDTH: usize = 8;

/// Configuration consumed by the naming, layout, extraction, and formatting steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Name of the nested enum holding the constants.
    pub enum_name: String,
    /// Interface the enum implements; together with `enum_name` forms the header marker.
    pub capability: String,
    pub tag_namespace: String,
    pub unknown_tag: String,
    /// Category name -> file stem, for categories the general transform gets wrong.
    pub category_overrides: BTreeMap<String, String>,
    /// Categories that intentionally have no generated block.
    pub ignored_categories: Vec<String>,
    /// Words rendered fully upper-case by the category transform.
    pub acronyms: Vec<String>,
    pub enum_dir: String,
    pub fallback_dir: String,
    /// File stem -> path relative to the project root.
    pub special_paths: BTreeMap<String, String>,
    pub source_extension: String,
    /// File stem -> hex digit count.
    pub hex_widths: BTreeMap<String, usize>,
    pub default_hex_width: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let category_overrides = [
            ("DRBG Algorithm", "DrbgAlgorithm"),
            ("FIPS186 Variation", "Fips186Variation"),
            ("NIST Key Type", "NistKeyType"),
            ("Key Wrap Type", "KeyWrapType"),
            ("Adjustment Type", "AdjustmentType"),
            ("Batch Error Continuation Option", "BatchErrorContinuationOption"),
            ("Digital Signature Algorithm", "DigitalSignatureAlgorithm"),
            ("Tag", "KmipTag"),
        ]
        .into_iter()
        .map(|(category, stem)| (category.to_string(), stem.to_string()))
        .collect();

        let acronyms = [
            "uri", "rsa", "dsa", "dh", "ec", "ecdsa", "ecmqv", "pgp", "x509",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        SyncConfig {
            enum_name: "Standard".to_string(),
            capability: "Value".to_string(),
            tag_namespace: "KmipSpec".to_string(),
            unknown_tag: "UnknownVersion".to_string(),
            category_overrides,
            ignored_categories: vec!["Opaque Data Type".to_string()],
            acronyms,
            enum_dir: DEFAULT_ENUM_DIR.to_string(),
            fallback_dir: DEFAULT_FALLBACK_DIR.to_string(),
            special_paths: BTreeMap::from([(
                "KmipTag".to_string(),
                format!("{DEFAULT_FALLBACK_DIR}/KmipTag.java"),
            )]),
            source_extension: "java".to_string(),
            hex_widths: BTreeMap::from([("KmipTag".to_string(), 6)]),
            default_hex_width: DEFAULT_HEX_WIDTH,
        }
    }
}

impl SyncConfig {
    pub fn hex_width(&self, stem: &str) -> usize {
        self.hex_widths
            .get(stem)
            .copied()
            .unwrap_or(self.default_hex_width)
    }
}

/// Load a config from JSON, falling back to defaults for omitted fields.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: SyncConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &SyncConfig) -> Result<()> {
    for (field, value) in [
        ("enum_name", &config.enum_name),
        ("capability", &config.capability),
        ("tag_namespace", &config.tag_namespace),
        ("unknown_tag", &config.unknown_tag),
        ("source_extension", &config.source_extension),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("{field} must be non-empty"));
        }
    }
    for (stem, width) in config
        .hex_widths
        .iter()
        .map(|(stem, width)| (stem.as_str(), *width))
        .chain(std::iter::once(("default_hex_width", config.default_hex_width)))
    {
        if !(1..=8).contains(&width) {
            return Err(anyhow!("hex width for {stem} must be within 1..=8 (got {width})"));
        }
    }
    validate_relative_path(&config.enum_dir, "enum_dir")?;
    validate_relative_path(&config.fallback_dir, "fallback_dir")?;
    for (stem, rel) in &config.special_paths {
        validate_relative_path(rel, &format!("special_paths.{stem}"))?;
    }
    Ok(())
}

fn validate_relative_path(rel: &str, label: &str) -> Result<()> {
    let path = Path::new(rel);
    if rel.trim().is_empty() {
        return Err(anyhow!("{label} must be non-empty"));
    }
    if path.is_absolute() {
        return Err(anyhow!("{label} must be a relative path (got {rel})"));
    }
    if path
        .components()
        .any(|component| matches!(component, std::path::Component::ParentDir))
    {
        return Err(anyhow!("{label} must not contain '..' (got {rel})"));
    }
    Ok(())
}
