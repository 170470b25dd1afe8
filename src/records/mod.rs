pub mod kind;
pub mod types;
pub mod wire;

pub use kind::{KindDescriptor, Record, RecordId, RecordKind, StoredRecord};
pub use types::{
    DEFAULT_EXAM_TYPE, ExamResult, Notice, NoticeDraft, ResultDraft, Student, StudentDraft,
    Teacher, TeacherDraft,
};
