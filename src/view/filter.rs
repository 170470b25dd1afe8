use crate::{
    records::Record,
    view::criteria::{FilterCriteria, Selection},
};

/// Returns the records admitted by every active predicate, in input order.
///
/// Nothing passes while the category gate is closed.
pub fn apply<R: Record>(records: &[R], criteria: &FilterCriteria) -> Vec<R> {
    let Some(category) = criteria.gated_category() else {
        return Vec::new();
    };
    let needle = search_needle(&criteria.search_text);

    records
        .iter()
        .filter(|record| record.primary_category() == category)
        .filter(|record| match (&criteria.secondary, R::DESCRIPTOR.secondary_label) {
            (Selection::Only(wanted), Some(_)) => {
                record.secondary_category() == Some(wanted.as_str())
            }
            _ => true,
        })
        .filter(|record| criteria.exam_year.admits(record.exam_year().as_ref()))
        .filter(|record| match needle.as_deref() {
            Some(needle) => matches_search(*record, needle),
            None => true,
        })
        .cloned()
        .collect()
}

pub fn matches_search<R: Record>(record: &R, needle: &str) -> bool {
    record
        .searchable_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn search_needle(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}
