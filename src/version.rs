//! Version tag model.
//!
//! Tags are rendered as `<namespace>.V<major>_<minor>` plus one sentinel
//! `<namespace>.<unknown>`; anything else is carried as an opaque token.
use regex::Regex;

/// A recognized version tag. `Unknown` sorts before every concrete release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionTag {
    Unknown,
    Release { major: u32, minor: u32 },
}

impl VersionTag {
    /// Parse a dotted revision such as `2.1`.
    pub fn from_revision(revision: &str) -> Option<Self> {
        let (major, minor) = revision.trim().split_once('.')?;
        Some(VersionTag::Release {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

/// One entry of a version list, as found in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagToken {
    Known(VersionTag),
    Opaque(String),
}

/// Textual scheme for tags in generated source.
#[derive(Debug, Clone)]
pub struct TagScheme {
    namespace: String,
    unknown_ident: String,
    release_re: Regex,
}

impl TagScheme {
    pub fn new(namespace: &str, unknown_ident: &str) -> Self {
        let pattern = format!(r"^{}\.V(\d+)_(\d+)$", regex::escape(namespace));
        TagScheme {
            namespace: namespace.to_string(),
            unknown_ident: unknown_ident.to_string(),
            release_re: Regex::new(&pattern).expect("escaped namespace is a valid pattern"),
        }
    }

    pub fn parse(&self, token: &str) -> TagToken {
        let token = token.trim();
        if let Some(ident) = token
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
        {
            if ident == self.unknown_ident {
                return TagToken::Known(VersionTag::Unknown);
            }
        }
        if let Some(caps) = self.release_re.captures(token) {
            if let (Ok(major), Ok(minor)) = (caps[1].parse(), caps[2].parse()) {
                return TagToken::Known(VersionTag::Release { major, minor });
            }
        }
        TagToken::Opaque(token.to_string())
    }

    pub fn render(&self, tag: VersionTag) -> String {
        match tag {
            VersionTag::Unknown => format!("{}.{}", self.namespace, self.unknown_ident),
            VersionTag::Release { major, minor } => {
                format!("{}.V{}_{}", self.namespace, major, minor)
            }
        }
    }

    /// Split a raw comma-separated version list into tokens, dropping blanks.
    pub fn split_list(&self, raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True when any token in `raw` parses to `tag`.
    pub fn list_contains(&self, raw: &str, tag: VersionTag) -> bool {
        self.split_list(raw)
            .iter()
            .any(|token| self.parse(token) == TagToken::Known(tag))
    }
}

/// Canonicalize a version list.
///
/// `Unknown` is always present and first, `target` is added or removed per
/// `ensure_target`, concrete releases follow in ascending order, and opaque
/// tokens trail in their original relative order.
pub fn normalize(
    tags: &[String],
    ensure_target: bool,
    target: VersionTag,
    scheme: &TagScheme,
) -> Vec<String> {
    let mut known: Vec<VersionTag> = vec![VersionTag::Unknown];
    let mut opaque: Vec<String> = Vec::new();
    for token in tags {
        match scheme.parse(token) {
            TagToken::Known(tag) => known.push(tag),
            TagToken::Opaque(text) => {
                if !text.is_empty() && !opaque.contains(&text) {
                    opaque.push(text);
                }
            }
        }
    }
    if ensure_target {
        known.push(target);
    } else if target != VersionTag::Unknown {
        known.retain(|tag| *tag != target);
    }
    known.sort();
    known.dedup();

    known
        .into_iter()
        .map(|tag| scheme.render(tag))
        .chain(opaque)
        .collect()
}
