use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    grading::{self, GradeLabel},
    records::{
        kind::{KindDescriptor, Record, RecordId, RecordKind, StoredRecord},
        wire,
    },
    view::SortKey,
};

pub const DEFAULT_EXAM_TYPE: &str = "annual";

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

fn default_exam_type() -> String {
    DEFAULT_EXAM_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub roll: String,
    #[serde(rename = "class")]
    pub class_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "roll is required"))]
    pub roll: String,
    #[serde(rename = "class")]
    #[validate(length(min = 1, message = "class is required"))]
    pub class_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl StoredRecord for Student {
    type Draft = StudentDraft;

    const KIND: RecordKind = RecordKind::Students;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: RecordId, draft: StudentDraft) -> Self {
        Self {
            id,
            name: draft.name,
            roll: draft.roll,
            class_label: draft.class_label,
            section: draft.section,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            photo: draft.photo,
        }
    }
}

impl Record for Student {
    const DESCRIPTOR: KindDescriptor = KindDescriptor {
        kind: RecordKind::Students,
        primary_label: "class",
        secondary_label: Some("section"),
        sort_keys: &[SortKey::ByName, SortKey::ByIdentifier, SortKey::ByCategory],
        scored: false,
    };

    fn display_name(&self) -> &str {
        &self.name
    }

    fn identifier(&self) -> Option<&str> {
        Some(&self.roll)
    }

    fn primary_category(&self) -> &str {
        &self.class_label
    }

    fn secondary_category(&self) -> Option<&str> {
        self.section.as_deref()
    }

    fn searchable_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.roll.as_str()];
        fields.extend(self.email.as_deref());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(
        rename = "experience",
        default,
        deserialize_with = "wire::optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub experience_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "designation is required"))]
    pub designation: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(
        rename = "experience",
        default,
        deserialize_with = "wire::optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub experience_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl StoredRecord for Teacher {
    type Draft = TeacherDraft;

    const KIND: RecordKind = RecordKind::Teachers;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: RecordId, draft: TeacherDraft) -> Self {
        Self {
            id,
            name: draft.name,
            designation: draft.designation,
            department: draft.department,
            email: draft.email,
            phone: draft.phone,
            qualification: draft.qualification,
            joining_date: draft.joining_date,
            experience_years: draft.experience_years,
            photo: draft.photo,
        }
    }
}

impl Record for Teacher {
    const DESCRIPTOR: KindDescriptor = KindDescriptor {
        kind: RecordKind::Teachers,
        primary_label: "department",
        secondary_label: Some("designation"),
        sort_keys: &[SortKey::ByName, SortKey::ByCategory],
        scored: false,
    };

    fn display_name(&self) -> &str {
        &self.name
    }

    fn identifier(&self) -> Option<&str> {
        None
    }

    fn primary_category(&self) -> &str {
        &self.department
    }

    fn secondary_category(&self) -> Option<&str> {
        Some(&self.designation)
    }

    fn searchable_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.designation.as_str(),
            self.department.as_str(),
        ];
        fields.extend(self.email.as_deref());
        fields.extend(self.qualification.as_deref());
        fields
    }
}

/// One subject mark for one student in one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub student_name: String,
    pub roll: String,
    #[serde(rename = "class")]
    pub class_label: String,
    pub subject: String,
    #[serde(rename = "marks", deserialize_with = "wire::required_number")]
    pub score: i64,
    #[serde(rename = "year", deserialize_with = "wire::required_year")]
    pub exam_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
}

impl ExamResult {
    pub fn grade(&self) -> GradeLabel {
        grading::classify(self.score)
    }
}

/// Form state for a result. The grade is never stored: it is derived from
/// whatever the score field holds right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResultDraft {
    #[validate(length(min = 1, message = "student name is required"))]
    pub student_name: String,
    #[validate(length(min = 1, message = "roll is required"))]
    pub roll: String,
    #[serde(rename = "class")]
    #[validate(length(min = 1, message = "class is required"))]
    pub class_label: String,
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    #[serde(
        rename = "marks",
        default,
        deserialize_with = "wire::optional_number"
    )]
    #[validate(
        required(message = "marks are required"),
        range(min = 0, max = 100, message = "marks must be between 0 and 100")
    )]
    pub score: Option<i64>,
    #[serde(rename = "year")]
    pub exam_year: i32,
    #[serde(default = "default_exam_type")]
    pub exam_type: String,
}

impl Default for ResultDraft {
    fn default() -> Self {
        Self {
            student_name: String::new(),
            roll: String::new(),
            class_label: String::new(),
            subject: String::new(),
            score: None,
            exam_year: current_year(),
            exam_type: default_exam_type(),
        }
    }
}

impl ResultDraft {
    /// Applies a keystroke-level edit of the marks field.
    pub fn set_score_input(&mut self, raw: &str) {
        self.score = grading::parse_score(raw);
    }

    pub fn grade(&self) -> GradeLabel {
        grading::classify_optional(self.score)
    }
}

impl From<&ExamResult> for ResultDraft {
    fn from(result: &ExamResult) -> Self {
        Self {
            student_name: result.student_name.clone(),
            roll: result.roll.clone(),
            class_label: result.class_label.clone(),
            subject: result.subject.clone(),
            score: Some(result.score),
            exam_year: result.exam_year,
            exam_type: result
                .exam_type
                .clone()
                .unwrap_or_else(default_exam_type),
        }
    }
}

impl StoredRecord for ExamResult {
    type Draft = ResultDraft;

    const KIND: RecordKind = RecordKind::Results;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: RecordId, draft: ResultDraft) -> Self {
        Self {
            id,
            student_name: draft.student_name,
            roll: draft.roll,
            class_label: draft.class_label,
            subject: draft.subject,
            score: draft.score.unwrap_or_default(),
            exam_year: draft.exam_year,
            exam_type: Some(draft.exam_type),
        }
    }
}

impl Record for ExamResult {
    const DESCRIPTOR: KindDescriptor = KindDescriptor {
        kind: RecordKind::Results,
        primary_label: "class",
        secondary_label: Some("subject"),
        sort_keys: &[
            SortKey::ByName,
            SortKey::ByIdentifier,
            SortKey::ByCategory,
            SortKey::ByScoreDescending,
        ],
        scored: true,
    };

    fn display_name(&self) -> &str {
        &self.student_name
    }

    fn identifier(&self) -> Option<&str> {
        Some(&self.roll)
    }

    fn primary_category(&self) -> &str {
        &self.class_label
    }

    fn secondary_category(&self) -> Option<&str> {
        Some(&self.subject)
    }

    fn exam_year(&self) -> Option<i32> {
        Some(self.exam_year)
    }

    fn score(&self) -> Option<i64> {
        Some(self.score)
    }

    fn searchable_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.roll.as_str(),
            self.subject.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct NoticeDraft {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

impl StoredRecord for Notice {
    type Draft = NoticeDraft;

    const KIND: RecordKind = RecordKind::Notices;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: RecordId, draft: NoticeDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            date: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .ok(),
        }
    }
}
