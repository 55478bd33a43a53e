//! Default filling and id assignment for imported records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shelfkeep_catalog::{FieldValue, Record, RecordKind};

/// How records without an id are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdPolicy {
    /// 1-based position in the current batch: `"001"`, `"002"`, ...
    /// A second import restarts at `"001"` and may collide with earlier ids.
    #[default]
    #[serde(rename = "batch")]
    BatchPosition,
    /// Continue after the largest numeric id already in the collection.
    #[serde(rename = "continue")]
    ContinueCollection,
}

impl IdPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchPosition => "batch",
            Self::ContinueCollection => "continue",
        }
    }
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" | "batch-position" => Ok(Self::BatchPosition),
            "continue" | "continue-collection" => Ok(Self::ContinueCollection),
            other => Err(format!("Unknown id policy: {other} (expected batch or continue)")),
        }
    }
}

/// What normalizing changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Fields that were absent or falsy and now hold their default.
    pub defaults_applied: usize,
    pub ids_assigned: usize,
}

impl std::ops::AddAssign for NormalizeStats {
    fn add_assign(&mut self, other: Self) {
        self.defaults_applied += other.defaults_applied;
        self.ids_assigned += other.ids_assigned;
    }
}

const DEFAULT_TYPE: &str = "figures";

/// Required fields and their defaults for one kind, in the order they are
/// appended to a record.
fn defaults_for(kind: RecordKind) -> Vec<(&'static str, FieldValue)> {
    let mut defaults = vec![("type", FieldValue::text(DEFAULT_TYPE))];
    if kind == RecordKind::Figures {
        defaults.extend([
            ("condition", FieldValue::text("new")),
            ("shelf", FieldValue::text("Eins")),
            ("display", FieldValue::text("Silent Horrors")),
            ("ranking", FieldValue::Integer(0)),
        ]);
    }
    defaults
}

/// Fills defaults and ids for records of one kind.
#[derive(Debug, Clone)]
pub struct Normalizer {
    kind: RecordKind,
    policy: IdPolicy,
    /// Added to the batch position under `ContinueCollection`.
    offset: usize,
    defaults: Vec<(&'static str, FieldValue)>,
}

impl Normalizer {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            policy: IdPolicy::default(),
            offset: 0,
            defaults: defaults_for(kind),
        }
    }

    pub fn with_policy(mut self, policy: IdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Base for `ContinueCollection` numbering: the largest numeric id in
    /// `existing`. Non-numeric ids are ignored.
    pub fn continue_after(mut self, existing: &[Record]) -> Self {
        self.offset = existing
            .iter()
            .filter_map(|r| r.id())
            .filter_map(|id| id.trim().parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// Normalize one record. `position` is its 1-based index in the batch.
    ///
    /// Each required field is checked on its own; a supplied, truthy value
    /// is never replaced. Running this twice changes nothing the second time.
    pub fn normalize_record(&self, record: &mut Record, position: usize) -> NormalizeStats {
        let mut stats = NormalizeStats::default();

        for (field, default) in &self.defaults {
            let needs_default = record.get(field).is_none_or(FieldValue::is_falsy);
            if needs_default && record.get(field) != Some(default) {
                record.set(*field, default.clone());
                stats.defaults_applied += 1;
            }
        }

        if record.id().is_none() {
            let number = match self.policy {
                IdPolicy::BatchPosition => position,
                IdPolicy::ContinueCollection => self.offset.checked_add(position).unwrap_or_else(|| {
                    log::warn!("Largest stored id {} leaves no room to continue; numbering by batch position", self.offset);
                    position
                }),
            };
            record.set_first("id", format_id(number));
            stats.ids_assigned += 1;
        }

        stats
    }

    /// Normalize a whole batch in order.
    pub fn normalize_batch(&self, records: &mut [Record]) -> NormalizeStats {
        let mut total = NormalizeStats::default();
        for (idx, record) in records.iter_mut().enumerate() {
            total += self.normalize_record(record, idx + 1);
        }
        total
    }
}

/// Zero-padded to three digits; wider numbers are kept whole.
pub fn format_id(number: usize) -> String {
    format!("{number:03}")
}
