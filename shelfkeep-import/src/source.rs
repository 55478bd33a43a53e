//! Import sources: delimited text or a JSON array, both producing the same
//! record sequence for the normalizer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shelfkeep_catalog::{CoercionTable, Record};

use crate::error::{json_kind, ImportError};
use crate::materialize::{materialize_row, HeaderSet};
use crate::tokenizer::{split_lines, tokenize_line, DELIMITER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    #[serde(rename = "csv", alias = "delimited")]
    Delimited,
    Json,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "delimited" | "text" => Ok(Self::Delimited),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown import format: {other} (expected csv or json)")),
        }
    }
}

/// Raw import input, tagged with how it should be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseSource {
    DelimitedText(String),
    JsonArray(String),
}

/// A numeric field that held non-numeric text and was set to `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFallback {
    /// 1-based source line.
    pub line: usize,
    pub field: String,
    pub token: String,
}

/// Records parsed from one source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch {
    pub records: Vec<Record>,
    pub format: SourceFormat,
    pub blank_lines_skipped: usize,
    pub coercion_fallbacks: Vec<CoercionFallback>,
}

impl ParseSource {
    /// Pick the parser from the first non-whitespace character: `[` or `{`
    /// means JSON, anything else is delimited text.
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        match text.trim_start().chars().next() {
            Some('[' | '{') => Self::JsonArray(text),
            _ => Self::DelimitedText(text),
        }
    }

    pub fn with_format(text: impl Into<String>, format: SourceFormat) -> Self {
        match format {
            SourceFormat::Delimited => Self::DelimitedText(text.into()),
            SourceFormat::Json => Self::JsonArray(text.into()),
        }
    }

    pub fn format(&self) -> SourceFormat {
        match self {
            Self::DelimitedText(_) => SourceFormat::Delimited,
            Self::JsonArray(_) => SourceFormat::Json,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::DelimitedText(text) | Self::JsonArray(text) => text,
        }
    }

    /// Parse the whole source. Either every record comes back or an error
    /// does; there is no partial result.
    pub fn records(&self, table: &CoercionTable) -> Result<ParsedBatch, ImportError> {
        match self {
            Self::DelimitedText(text) => parse_delimited(text, table),
            Self::JsonArray(text) => parse_json(text),
        }
    }
}

fn parse_delimited(text: &str, table: &CoercionTable) -> Result<ParsedBatch, ImportError> {
    let total_lines = text.split('\n').count();
    let mut lines = split_lines(text);
    let (_, header_line) = lines.next().ok_or(ImportError::MissingHeader)?;
    let headers = HeaderSet::parse(header_line, DELIMITER);

    let mut records = Vec::new();
    let mut coercion_fallbacks = Vec::new();
    let mut non_blank = 1;

    for (line_no, line) in lines {
        non_blank += 1;
        let tokens = tokenize_line(line, DELIMITER);
        let row = materialize_row(&headers, &tokens, table);
        for field in row.fallbacks {
            let token = token_for(&headers, &tokens, &field);
            log::debug!("line {line_no}: '{token}' is not a number, {field} set to 0");
            coercion_fallbacks.push(CoercionFallback {
                line: line_no,
                field,
                token,
            });
        }
        records.push(row.record);
    }

    // A trailing newline produces one empty final segment; it is not a
    // skipped row.
    let trailing = usize::from(text.ends_with('\n'));

    Ok(ParsedBatch {
        records,
        format: SourceFormat::Delimited,
        blank_lines_skipped: total_lines.saturating_sub(non_blank + trailing),
        coercion_fallbacks,
    })
}

fn token_for(headers: &HeaderSet, tokens: &[String], field: &str) -> String {
    headers
        .names()
        .iter()
        .position(|name| name == field)
        .and_then(|idx| tokens.get(idx))
        .cloned()
        .unwrap_or_default()
}

fn parse_json(text: &str) -> Result<ParsedBatch, ImportError> {
    // Check the shape first so errors name the offending element, then
    // deserialize records straight from the text to keep field order.
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = &value else {
        return Err(ImportError::NotAnArray {
            found: json_kind(&value),
        });
    };
    if let Some((index, item)) = items.iter().enumerate().find(|(_, item)| !item.is_object()) {
        return Err(ImportError::NotAnObject {
            index,
            found: json_kind(item),
        });
    }

    let records: Vec<Record> = serde_json::from_str(text)?;

    Ok(ParsedBatch {
        records,
        format: SourceFormat::Json,
        blank_lines_skipped: 0,
        coercion_fallbacks: Vec::new(),
    })
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
