use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Serialize, Serializer};

use crate::{records::Record, view::criteria::ALL};

const NO_DATA: &str = "no data";

/// Mean score rounded to one decimal, or the "no data" marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeanScore {
    NoData,
    Value(f64),
}

impl MeanScore {
    pub fn of(scores: &[i64]) -> Self {
        if scores.is_empty() {
            return MeanScore::NoData;
        }
        let total: i128 = scores.iter().map(|&score| i128::from(score)).sum();
        let mean = total as f64 / scores.len() as f64;
        MeanScore::Value((mean * 10.0).round() / 10.0)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            MeanScore::NoData => None,
            MeanScore::Value(value) => Some(value),
        }
    }
}

impl fmt::Display for MeanScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeanScore::NoData => f.write_str(NO_DATA),
            MeanScore::Value(value) => write!(f, "{value:.1}"),
        }
    }
}

impl Serialize for MeanScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MeanScore::NoData => serializer.serialize_str(NO_DATA),
            MeanScore::Value(value) => serializer.serialize_f64(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary<R> {
    pub mean_score: MeanScore,
    pub top_scorer: Option<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats<R> {
    pub count: usize,
    pub distinct_identifiers: usize,
    pub distinct_secondary: usize,
    /// Only present for kinds that carry a score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreSummary<R>>,
}

impl<R> Stats<R> {
    pub fn mean_score(&self) -> Option<MeanScore> {
        self.scores.as_ref().map(|scores| scores.mean_score)
    }

    pub fn top_scorer(&self) -> Option<&R> {
        self.scores
            .as_ref()
            .and_then(|scores| scores.top_scorer.as_ref())
    }
}

pub fn summarize<R: Record>(records: &[R]) -> Stats<R> {
    let distinct_identifiers = records
        .iter()
        .filter_map(Record::identifier)
        .collect::<BTreeSet<_>>()
        .len();
    let distinct_secondary = records
        .iter()
        .filter_map(Record::secondary_category)
        .collect::<BTreeSet<_>>()
        .len();

    Stats {
        count: records.len(),
        distinct_identifiers,
        distinct_secondary,
        scores: R::DESCRIPTOR.scored.then(|| score_summary(records)),
    }
}

fn score_summary<R: Record>(records: &[R]) -> ScoreSummary<R> {
    let scores: Vec<i64> = records.iter().filter_map(Record::score).collect();

    // First maximum in the given order wins ties.
    let mut top: Option<(&R, i64)> = None;
    for record in records {
        let Some(score) = record.score() else {
            continue;
        };
        if top.is_none_or(|(_, best)| score > best) {
            top = Some((record, score));
        }
    }

    ScoreSummary {
        mean_score: MeanScore::of(&scores),
        top_scorer: top.map(|(record, _)| record.clone()),
    }
}

/// Selectable filter values, derived from the full collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    /// Name of the gating field, e.g. "class" or "department".
    pub primary_label: &'static str,
    pub secondary_label: Option<&'static str>,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub exam_years: Vec<String>,
    pub primary_counts: BTreeMap<String, usize>,
}

pub fn facets<R: Record>(records: &[R]) -> Facets {
    let mut primary_counts = BTreeMap::new();
    let mut secondary = BTreeSet::new();
    let mut years = BTreeSet::new();

    for record in records {
        let category = record.primary_category();
        if !category.trim().is_empty() {
            *primary_counts.entry(category.to_string()).or_insert(0) += 1;
        }
        if let Some(value) = record.secondary_category().filter(|value| !value.is_empty()) {
            secondary.insert(value.to_string());
        }
        if let Some(year) = record.exam_year() {
            years.insert(year);
        }
    }

    Facets {
        primary_label: R::DESCRIPTOR.primary_label,
        secondary_label: R::DESCRIPTOR.secondary_label,
        primary: primary_counts.keys().cloned().collect(),
        secondary: std::iter::once(ALL.to_string())
            .chain(secondary)
            .collect(),
        exam_years: std::iter::once(ALL.to_string())
            .chain(years.into_iter().rev().map(|year| year.to_string()))
            .collect(),
        primary_counts,
    }
}
