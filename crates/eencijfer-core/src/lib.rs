//! Eencijfer assets built from the enriched tables.
//!
//! - [`cohort`]: entry cohorts with first-year status and degree timing
//! - [`exams`]: final-exam grades in long form, last attempt per subject
//! - [`pseudonymize`]: pseudo-ids, PII removal and local ids

pub mod cohort;
pub mod error;
pub mod exams;
pub mod pseudonymize;

pub use cohort::{derive_cohorts, entry_cohort};
pub use error::{CoreError, Result};
pub use exams::{attempt_for, exam_kind_for, exam_prior_education, reshape_exam_grades};
pub use pseudonymize::{
    LocalIdTable, MAX_PSEUDO_IDS, PSEUDO_ID_WIDTH, PrivacyOptions, PseudoIdMapping,
    attach_local_id, protect_tables, scrub_pii,
};
