//! Domain model for the eencijfer register ETL.
//!
//! Shared vocabulary for the ingest, transform and core crates: layout
//! definitions for fixed-width files, categorical code tables, column names
//! and persisted table formats.

pub mod codes;
pub mod columns;
pub mod export;
pub mod layout;

pub use codes::{
    CrohoSector, DiplomaPhase, EnrollmentForm, ExamKind, HigherEducationType,
    PerformanceAgreement, PriorEducationRole, ProgramType, Sex, StatusAfterYear1,
};
pub use export::ExportFormat;
pub use layout::{
    FieldSpan, GARBAGE_COLUMN, GARBAGE_WIDTH, LayoutDefinition, LayoutField, LayoutIssue,
};
