//! Enrichment of the decoded eencijfer student table.
//!
//! The pipeline runs a fixed sequence of row-preserving steps that join
//! reference tables and decode categorical codes. See [`pipeline`] for the
//! step order and the per-step contract.

pub mod error;
pub mod pipeline;
pub mod reference;
pub mod steps;

pub use error::{Result, TransformError};
pub use pipeline::{
    EnrichmentPipeline, EnrichmentStep, StepReport, build_default_pipeline, check_contract,
};
pub use reference::{
    DEC_BRINVESTIGINGSNUMMER, DEC_HO_ISCED, DEC_ISAT, DEC_VOOROPL, DEC_VOPL, LOCAL_NAMES,
    ReferenceTables,
};
pub use steps::{VOOROPLEIDING_OVERIG, in_pa_cohort, profile_for_code, vooropleiding_kort};
