//! Enrichment pipeline with ordered step execution.
//!
//! Each step implements [`EnrichmentStep`] and declares the columns it
//! writes. The pipeline checks every step against that declaration and
//! rejects steps that change the row count or drop input columns.
//!
//! # Standard Pipeline Order
//!
//! 1. **aantal** - Count column
//! 2. **vooropleiding** - Prior-education description, profile and short code
//! 3. **instelling_vooropleiding** - Institution of the prior education
//! 4. **naam_opleiding** - Program name from the program register
//! 5. **opleiding** - Canonical program code
//! 6. **croho_onderdeel** - Program sector
//! 7. **soort_diploma** - Diploma type
//! 8. **ho_diploma_eerste_jaar** - Degree in the first year at the institution
//! 9. **type_opleiding** - Program phase
//! 10. **lokale_naam_opleiding** - Institution-local program and faculty names
//! 11. **pa_cohort** - Performance-agreement cohort flag
//! 12. **isced** - ISCED-F 2013 classification

use std::collections::BTreeSet;

use polars::prelude::DataFrame;

use eencijfer_model::PriorEducationRole;

use crate::error::{Result, TransformError};
use crate::reference::ReferenceTables;
use crate::steps::{
    AantalStep, CrohoOnderdeelStep, HoDiplomaEersteJaarStep, InstellingVooropleidingStep,
    IscedStep, LokaleNaamOpleidingStep, NaamOpleidingStep, OpleidingStep, PaCohortStep,
    SoortDiplomaStep, TypeOpleidingStep, VooropleidingStep,
};

/// A single row-preserving step of the enrichment pipeline.
pub trait EnrichmentStep: Send + Sync {
    /// Human-readable name for this step (for logging and reports).
    fn step_name(&self) -> &str;

    /// Columns this step writes when applied to `input`.
    ///
    /// Every declared column must exist after the step and every column the
    /// step adds must be declared.
    fn declared_columns(&self, input: &DataFrame, refs: &ReferenceTables) -> Vec<String>;

    /// Produce the enriched table.
    fn execute(&self, df: &DataFrame, refs: &ReferenceTables) -> Result<DataFrame>;

    /// Whether this step is skipped, e.g. because an optional reference
    /// table is absent. Default implementation always runs the step.
    fn should_skip(&self, _refs: &ReferenceTables) -> bool {
        false
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub skipped: bool,
    /// Columns that did not exist before the step.
    pub added: Vec<String>,
}

/// An ordered pipeline of enrichment steps.
pub struct EnrichmentPipeline {
    steps: Vec<Box<dyn EnrichmentStep>>,
}

impl Default for EnrichmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrichmentPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the end of the pipeline.
    pub fn add_step(mut self, step: Box<dyn EnrichmentStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Remove a step by name.
    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|s| s.step_name() != step_name);
        self
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }

    /// Execute all steps in order.
    pub fn execute(
        &self,
        df: DataFrame,
        refs: &ReferenceTables,
    ) -> Result<(DataFrame, Vec<StepReport>)> {
        let mut current = df;
        let mut reports = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let name = step.step_name();
            if step.should_skip(refs) {
                tracing::warn!(step = name, "Skipping enrichment step");
                reports.push(StepReport {
                    step: name.to_string(),
                    skipped: true,
                    added: Vec::new(),
                });
                continue;
            }

            let declared = step.declared_columns(&current, refs);
            let output = step.execute(&current, refs)?;
            let added = check_contract(name, &current, &output, &declared)?;
            tracing::info!(
                step = name,
                rows = output.height(),
                added = %added.join(", "),
                "Enrichment step finished"
            );
            reports.push(StepReport {
                step: name.to_string(),
                skipped: false,
                added,
            });
            current = output;
        }
        Ok((current, reports))
    }
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Verifies the row count and declared columns of one step.
///
/// Returns the added columns in output order.
pub fn check_contract(
    step: &str,
    input: &DataFrame,
    output: &DataFrame,
    declared: &[String],
) -> Result<Vec<String>> {
    if input.height() != output.height() {
        return Err(TransformError::RowCountMismatch {
            step: step.to_string(),
            expected: input.height(),
            actual: output.height(),
        });
    }

    let before: BTreeSet<String> = column_names(input).into_iter().collect();
    let after_ordered = column_names(output);
    let after: BTreeSet<&String> = after_ordered.iter().collect();

    let removed: Vec<&str> = before
        .iter()
        .filter(|c| !after.contains(c))
        .map(String::as_str)
        .collect();
    if !removed.is_empty() {
        return Err(TransformError::RemovedColumns {
            step: step.to_string(),
            columns: removed.join(", "),
        });
    }

    let missing: Vec<&str> = declared
        .iter()
        .filter(|c| !after.contains(c))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::MissingDeclaredColumns {
            step: step.to_string(),
            columns: missing.join(", "),
        });
    }

    let added: Vec<String> = after_ordered
        .into_iter()
        .filter(|c| !before.contains(c))
        .collect();
    let undeclared: Vec<&str> = added
        .iter()
        .filter(|c| !declared.contains(*c))
        .map(String::as_str)
        .collect();
    if !undeclared.is_empty() {
        return Err(TransformError::UndeclaredColumns {
            step: step.to_string(),
            columns: undeclared.join(", "),
        });
    }
    Ok(added)
}

/// Builds the standard enrichment pipeline.
///
/// `role` selects which prior-education field is decoded.
pub fn build_default_pipeline(role: PriorEducationRole) -> EnrichmentPipeline {
    EnrichmentPipeline::new()
        .add_step(Box::new(AantalStep))
        .add_step(Box::new(VooropleidingStep::new(role)))
        .add_step(Box::new(InstellingVooropleidingStep::new(role)))
        .add_step(Box::new(NaamOpleidingStep))
        .add_step(Box::new(OpleidingStep))
        .add_step(Box::new(CrohoOnderdeelStep))
        .add_step(Box::new(SoortDiplomaStep))
        .add_step(Box::new(HoDiplomaEersteJaarStep))
        .add_step(Box::new(TypeOpleidingStep))
        .add_step(Box::new(LokaleNaamOpleidingStep))
        .add_step(Box::new(PaCohortStep))
        .add_step(Box::new(IscedStep))
}
