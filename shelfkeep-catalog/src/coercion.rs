//! Field-coercion table: which raw text tokens become numbers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::FieldValue;

/// How a raw token for a given field is turned into a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionRule {
    /// Keep the token verbatim.
    #[default]
    Text,
    /// Parse as a number; unparseable text becomes `0`.
    Number,
}

/// Result of coercing one token.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: FieldValue,
    /// True when a numeric field held non-numeric text and was set to `0`.
    pub fell_back: bool,
}

impl CoercionRule {
    pub fn apply(&self, token: &str) -> Coerced {
        match self {
            Self::Text => Coerced {
                value: FieldValue::Text(token.to_string()),
                fell_back: false,
            },
            Self::Number => coerce_number(token),
        }
    }
}

/// Number coercion. Blank tokens are `0` without counting as a fallback,
/// matching how an empty spreadsheet cell reads as zero.
fn coerce_number(token: &str) -> Coerced {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Coerced {
            value: FieldValue::Integer(0),
            fell_back: false,
        };
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Coerced {
            value: FieldValue::Integer(n),
            fell_back: false,
        };
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Coerced {
            value: FieldValue::Float(f),
            fell_back: false,
        },
        _ => Coerced {
            value: FieldValue::Integer(0),
            fell_back: true,
        },
    }
}

/// Maps field names to coercion rules. Fields without an entry are text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionTable {
    rules: HashMap<String, CoercionRule>,
}

impl Default for CoercionTable {
    /// `price` and `ranking` are numeric; everything else is text.
    fn default() -> Self {
        Self::empty()
            .with_rule("price", CoercionRule::Number)
            .with_rule("ranking", CoercionRule::Number)
    }
}

impl CoercionTable {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, field: impl Into<String>, rule: CoercionRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Rule for a field. Matching is exact, so `Price` stays text.
    pub fn rule_for(&self, field: &str) -> CoercionRule {
        self.rules.get(field).copied().unwrap_or_default()
    }

    pub fn coerce(&self, field: &str, token: &str) -> Coerced {
        self.rule_for(field).apply(token)
    }
}
