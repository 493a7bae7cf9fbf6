//! Constant block extraction.
//!
//! A source file is split into three parts: the prefix (everything up to the
//! first constant record, header included), the constant region, and the
//! suffix (everything after the record that terminates the constant list).
//! Only the region is ever regenerated.
use crate::config::SyncConfig;
use crate::naming::is_reserved_text;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_INDENT: &str = "        ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("no `{0}` block header found")]
    HeaderNotFound(String),
    #[error("block opened on line {0} is never closed")]
    Unterminated(usize),
    #[error("block contains no parsable constants")]
    NoConstants,
    #[error("constant list has lines that are not single-line records: {}", render_lines(.0))]
    UnparsedLines(Vec<(usize, String)>),
}

fn render_lines(lines: &[(usize, String)]) -> String {
    lines
        .iter()
        .map(|(line, text)| format!("line {line}: {:?}", text.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One `NAME(0xVALUE, "label", TAGS...)` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub value: u32,
    pub label: String,
    /// Version list exactly as written between the label and the closing paren.
    pub versions: String,
}

impl Constant {
    pub fn parse_line(line: &str) -> Option<Constant> {
        parse_record(line).map(|(constant, _)| constant)
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved_text(&self.name) || is_reserved_text(&self.label)
    }
}

/// The record plus whether it closes the constant list with `;`.
fn parse_record(line: &str) -> Option<(Constant, bool)> {
    let caps = record_re().captures(line)?;
    let constant = Constant {
        name: caps[1].to_string(),
        value: u32::from_str_radix(&caps[2], 16).ok()?,
        label: caps[3].to_string(),
        versions: caps[4].trim().to_string(),
    };
    Some((constant, &caps[5] == ";"))
}

fn record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\s*([A-Z0-9_]+)\s*\(\s*0x([0-9A-Fa-f]{1,8})\s*,\s*"([^"]*)"\s*,\s*(.*?)\)\s*([,;]?)\s*(?://.*)?$"#,
        )
        .expect("static regex")
    })
}

/// Matches the line that opens the constant-bearing enum.
#[derive(Debug, Clone)]
pub struct HeaderMarker {
    label: String,
    re: Regex,
}

impl HeaderMarker {
    pub fn new(enum_name: &str, capability: &str) -> Self {
        let pattern = format!(
            r"\benum\s+{}\s+implements\s+{}\b",
            regex::escape(enum_name),
            regex::escape(capability)
        );
        HeaderMarker {
            label: format!("enum {enum_name} implements {capability}"),
            re: Regex::new(&pattern).expect("escaped marker is a valid pattern"),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        HeaderMarker::new(&config.enum_name, &config.capability)
    }

    fn matches(&self, line: &str) -> bool {
        self.re.is_match(line)
    }
}

/// A located block with its surrounding text kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBlock {
    pub prefix: String,
    pub region: String,
    pub suffix: String,
    pub constants: Vec<Constant>,
    pub indent: String,
}

pub fn extract_block(text: &str, marker: &HeaderMarker) -> Result<ExtractedBlock, BlockError> {
    let lines = line_spans(text);
    let header_idx = lines
        .iter()
        .position(|span| marker.matches(span.text))
        .ok_or_else(|| BlockError::HeaderNotFound(marker.label.clone()))?;

    let mut depth = brace_delta(lines[header_idx].text);
    let mut opened = depth > 0;
    let mut close_idx = None;
    for (idx, span) in lines.iter().enumerate().skip(header_idx + 1) {
        depth += brace_delta(span.text);
        if depth > 0 {
            opened = true;
        }
        if opened && depth <= 0 {
            close_idx = Some(idx);
            break;
        }
    }
    let close_idx = close_idx.ok_or(BlockError::Unterminated(header_idx + 1))?;

    let mut constants = Vec::new();
    let mut first_record = None;
    let mut last_record = None;
    let mut stray = Vec::new();
    for (idx, span) in lines
        .iter()
        .enumerate()
        .take(close_idx)
        .skip(header_idx + 1)
    {
        let Some((constant, terminated)) = parse_record(span.text) else {
            if first_record.is_some() && !is_blank_or_comment(span.text) {
                stray.push(idx);
            }
            continue;
        };
        constants.push(constant);
        first_record.get_or_insert(idx);
        last_record = Some(idx);
        if terminated {
            break;
        }
    }
    let (Some(first), Some(last)) = (first_record, last_record) else {
        return Err(BlockError::NoConstants);
    };
    // Anything between records that is not itself a record would be lost on
    // regeneration.
    let unparsed: Vec<(usize, String)> = stray
        .into_iter()
        .filter(|idx| *idx < last)
        .map(|idx| (idx + 1, lines[idx].text.to_string()))
        .collect();
    if !unparsed.is_empty() {
        return Err(BlockError::UnparsedLines(unparsed));
    }

    let region_start = lines[first].start;
    let region_end = lines[last].end;
    let first_text = lines[first].text;
    let indent_len = first_text.len() - first_text.trim_start().len();
    let indent = if indent_len == 0 {
        DEFAULT_INDENT.to_string()
    } else {
        first_text[..indent_len].to_string()
    };

    Ok(ExtractedBlock {
        prefix: text[..region_start].to_string(),
        region: text[region_start..region_end].to_string(),
        suffix: text[region_end..].to_string(),
        constants,
        indent,
    })
}

struct LineSpan<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

/// Lines with their byte offsets; `end` includes the newline.
fn line_spans(text: &str) -> Vec<LineSpan<'_>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        let end = start + line.len();
        spans.push(LineSpan {
            start,
            end,
            text: line.trim_end_matches(['\n', '\r']),
        });
        start = end;
    }
    spans
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("//")
}

/// Net `{`/`}` count, ignoring string and char literals and `//` comments.
fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if let Some(open) = quote {
            match ch {
                '\\' => {
                    chars.next();
                }
                c if c == open => quote = None,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '/' if chars.peek() == Some(&'/') => break,
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
