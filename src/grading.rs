use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeLabel {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl GradeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            GradeLabel::APlus => "A+",
            GradeLabel::A => "A",
            GradeLabel::AMinus => "A-",
            GradeLabel::B => "B",
            GradeLabel::C => "C",
            GradeLabel::D => "D",
            GradeLabel::F => "F",
            GradeLabel::Unclassified => "unclassified",
        }
    }

    pub fn is_passing(self) -> bool {
        !matches!(self, GradeLabel::F | GradeLabel::Unclassified)
    }
}

impl fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive lower bounds, highest band first. Anything below the last
/// bound is an F.
pub const GRADE_BANDS: [(i64, GradeLabel); 6] = [
    (80, GradeLabel::APlus),
    (70, GradeLabel::A),
    (60, GradeLabel::AMinus),
    (50, GradeLabel::B),
    (40, GradeLabel::C),
    (33, GradeLabel::D),
];

pub fn classify(score: i64) -> GradeLabel {
    GRADE_BANDS
        .iter()
        .find(|(lower_bound, _)| score >= *lower_bound)
        .map(|(_, label)| *label)
        .unwrap_or(GradeLabel::F)
}

pub fn classify_optional(score: Option<i64>) -> GradeLabel {
    score.map(classify).unwrap_or(GradeLabel::Unclassified)
}

/// Classifies a raw marks field exactly as it is typed.
pub fn classify_input(raw: &str) -> GradeLabel {
    classify_optional(parse_score(raw))
}

/// Reads the leading integer of a form field: surrounding whitespace and
/// trailing garbage are ignored, no digits means no score.
pub fn parse_score(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
