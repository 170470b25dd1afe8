use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use validator::Validate;

use crate::view::SortKey;

pub type RecordId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Students,
    Teachers,
    Results,
    Notices,
}

impl RecordKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            RecordKind::Students => "students",
            RecordKind::Teachers => "teachers",
            RecordKind::Results => "results",
            RecordKind::Notices => "notices",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "students" => Some(RecordKind::Students),
            "teachers" => Some(RecordKind::Teachers),
            "results" => Some(RecordKind::Results),
            "notices" => Some(RecordKind::Notices),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Per-kind configuration for the generic filter/sort/aggregate pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub kind: RecordKind,
    /// Human label of the gating field ("class", "department").
    pub primary_label: &'static str,
    pub secondary_label: Option<&'static str>,
    pub sort_keys: &'static [SortKey],
    /// Whether mean score and top scorer apply.
    pub scored: bool,
}

impl KindDescriptor {
    pub fn supports(&self, key: SortKey) -> bool {
        self.sort_keys.contains(&key)
    }
}

/// Anything the record store can list, create, replace and delete.
pub trait StoredRecord: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Draft: Clone + Send + Sync + Serialize + Validate + 'static;

    const KIND: RecordKind;

    fn id(&self) -> &str;

    /// Materializes a draft the way the store would, under a store-assigned id.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;
}

/// A stored record that takes part in the listing pipeline.
pub trait Record: StoredRecord {
    const DESCRIPTOR: KindDescriptor;

    fn display_name(&self) -> &str;

    fn identifier(&self) -> Option<&str>;

    fn primary_category(&self) -> &str;

    fn secondary_category(&self) -> Option<&str>;

    fn exam_year(&self) -> Option<i32> {
        None
    }

    fn score(&self) -> Option<i64> {
        None
    }

    fn searchable_fields(&self) -> Vec<&str>;
}
