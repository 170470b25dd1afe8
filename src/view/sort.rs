use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::records::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    ByName,
    ByIdentifier,
    ByCategory,
    ByScoreDescending,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::ByName,
        SortKey::ByIdentifier,
        SortKey::ByCategory,
        SortKey::ByScoreDescending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::ByName => "by-name",
            SortKey::ByIdentifier => "by-identifier",
            SortKey::ByCategory => "by-category",
            SortKey::ByScoreDescending => "by-score-descending",
        }
    }

    /// Accepts the canonical names plus the short forms used by the listing
    /// pages (`name`, `roll`, `class`, `marks`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "by-name" | "name" => Some(SortKey::ByName),
            "by-identifier" | "identifier" | "roll" => Some(SortKey::ByIdentifier),
            "by-category" | "category" | "class" | "department" => Some(SortKey::ByCategory),
            "by-score-descending" | "score" | "marks" => Some(SortKey::ByScoreDescending),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Comparator<R> = fn(&R, &R) -> Ordering;

pub fn comparator_for<R: Record>(key: SortKey) -> Comparator<R> {
    match key {
        SortKey::ByName => by_name::<R>,
        SortKey::ByIdentifier => by_identifier::<R>,
        SortKey::ByCategory => by_category::<R>,
        SortKey::ByScoreDescending => by_score_descending::<R>,
    }
}

/// Stable sort into a new vector; the input is left as it was.
pub fn sorted<R: Record>(records: &[R], key: SortKey) -> Vec<R> {
    let mut items = records.to_vec();
    sort_in_place(&mut items, key);
    items
}

pub(crate) fn sort_in_place<R: Record>(records: &mut [R], key: SortKey) {
    records.sort_by(comparator_for::<R>(key));
}

fn by_name<R: Record>(a: &R, b: &R) -> Ordering {
    compare_text(a.display_name(), b.display_name())
}

fn by_identifier<R: Record>(a: &R, b: &R) -> Ordering {
    compare_text(
        a.identifier().unwrap_or_default(),
        b.identifier().unwrap_or_default(),
    )
}

fn by_category<R: Record>(a: &R, b: &R) -> Ordering {
    compare_text(a.primary_category(), b.primary_category())
}

fn by_score_descending<R: Record>(a: &R, b: &R) -> Ordering {
    b.score().cmp(&a.score())
}

/// Base letters first, then accents; case never orders two names, so equal
/// names keep their input order under the stable sort.
fn compare_text(a: &str, b: &str) -> Ordering {
    folded(a, true)
        .cmp(folded(b, true))
        .then_with(|| folded(a, false).cmp(folded(b, false)))
}

fn folded(value: &str, strip_accents: bool) -> impl Iterator<Item = char> + '_ {
    value
        .nfd()
        .filter(move |c| !(strip_accents && is_combining_mark(*c)))
        .flat_map(char::to_lowercase)
}
