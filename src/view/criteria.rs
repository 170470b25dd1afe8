use std::fmt;

/// Sentinel used by selection lists for "no restriction".
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// `None` means the record has no such field, which never excludes it.
    pub fn admits(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Selection::All, _) | (_, None) => true,
            (Selection::Only(wanted), Some(value)) => wanted == value,
        }
    }
}

impl Selection<String> {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ALL {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

impl Selection<i32> {
    pub fn parse_year(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ALL {
            return Some(Selection::All);
        }
        trimmed.parse::<i32>().ok().map(Selection::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Class label or department. Nothing is listed until this is chosen.
    pub primary_category: Option<String>,
    pub search_text: String,
    pub secondary: Selection<String>,
    pub exam_year: Selection<i32>,
}

impl FilterCriteria {
    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            primary_category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn gate_open(&self) -> bool {
        self.gated_category().is_some()
    }

    pub fn gated_category(&self) -> Option<&str> {
        self.primary_category
            .as_deref()
            .filter(|category| !category.trim().is_empty())
    }

    pub fn apply(&mut self, patch: CriteriaPatch) {
        if let Some(primary_category) = patch.primary_category {
            self.primary_category = primary_category;
        }
        if let Some(search_text) = patch.search_text {
            self.search_text = search_text;
        }
        if let Some(secondary) = patch.secondary {
            self.secondary = secondary;
        }
        if let Some(exam_year) = patch.exam_year {
            self.exam_year = exam_year;
        }
    }
}

/// Partial criteria update; untouched fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaPatch {
    pub primary_category: Option<Option<String>>,
    pub search_text: Option<String>,
    pub secondary: Option<Selection<String>>,
    pub exam_year: Option<Selection<i32>>,
}

impl CriteriaPatch {
    pub fn category(category: impl Into<String>) -> Self {
        Self::default().with_category(category)
    }

    pub fn clear_category() -> Self {
        Self {
            primary_category: Some(None),
            ..Self::default()
        }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self::default().with_search(text)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.primary_category = Some(Some(category.into()));
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn with_secondary(mut self, secondary: Selection<String>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_exam_year(mut self, exam_year: Selection<i32>) -> Self {
        self.exam_year = Some(exam_year);
        self
    }
}
