pub mod controller;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod sort;
pub mod stats;

pub use controller::{DerivedView, LoadOutcome, Mutation, MutationOutcome, ViewModel, ViewState};
pub use criteria::{CriteriaPatch, FilterCriteria, Selection};
pub use error::ViewError;
pub use sort::{SortKey, comparator_for};
pub use stats::{Facets, MeanScore, Stats, summarize};
