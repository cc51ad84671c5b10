//! The enrichment steps, grouped by subject.

mod diploma;
mod opleiding;
mod prestatieafspraken;
mod vooropleiding;

use polars::prelude::{Column, DataFrame};

use eencijfer_common::int_column;
use eencijfer_model::columns::AANTAL;

use crate::error::Result;
use crate::pipeline::EnrichmentStep;
use crate::reference::ReferenceTables;

pub use diploma::{HoDiplomaEersteJaarStep, SoortDiplomaStep};
pub use opleiding::{
    CrohoOnderdeelStep, IscedStep, LokaleNaamOpleidingStep, NaamOpleidingStep, ONBEKEND,
    OpleidingStep, TypeOpleidingStep,
};
pub use prestatieafspraken::{PaCohortStep, in_pa_cohort};
pub use vooropleiding::{
    InstellingVooropleidingStep, VOOROPLEIDING_MARKERS, VOOROPLEIDING_OVERIG, VooropleidingStep,
    profile_for_code, vooropleiding_kort,
};

/// Returns a copy of `df` with `columns` added or replaced.
fn with_columns(df: &DataFrame, columns: Vec<Column>) -> Result<DataFrame> {
    let mut result = df.clone();
    for column in columns {
        result.with_column(column)?;
    }
    Ok(result)
}

/// Adds the count column `Aantal` = 1 used by aggregating reports.
pub struct AantalStep;

impl EnrichmentStep for AantalStep {
    fn step_name(&self) -> &str {
        "aantal"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        vec![AANTAL.to_string()]
    }

    fn execute(&self, df: &DataFrame, _refs: &ReferenceTables) -> Result<DataFrame> {
        let ones: Vec<Option<i64>> = vec![Some(1); df.height()];
        with_columns(df, vec![int_column(AANTAL, ones)])
    }
}
