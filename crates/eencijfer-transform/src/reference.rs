//! Reference tables consumed by the enrichment steps.

use std::path::Path;

use eencijfer_ingest::{read_csv, read_named_table};
use polars::prelude::DataFrame;

use crate::error::Result;

/// Prior-education descriptions (`VooropleidingCode`, `OmschrijvingVooropleiding`).
pub const DEC_VOPL: &str = "Dec_vopl";
/// Institution directory keyed on BRIN and branch number.
pub const DEC_BRINVESTIGINGSNUMMER: &str = "Dec_brinvestigingsnummer";
/// Program names keyed on `Opleidingscode`.
pub const DEC_ISAT: &str = "Dec_isat";
/// ISCED-F 2013 classification keyed on `Opleidingscode`.
pub const DEC_HO_ISCED: &str = "Dec_ho_ISCED";
/// Original prior-education codes of exam records.
pub const DEC_VOOROPL: &str = "Dec_vooropl";
/// Name used in diagnostics for the institution-local names file.
pub const LOCAL_NAMES: &str = "lokale_namen";

/// The read-only tables the pipeline joins against.
///
/// Every table is optional at load time; steps decide whether a missing
/// table is skipped or fatal.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub vooropleidingen: Option<DataFrame>,
    pub instellingen: Option<DataFrame>,
    pub opleidingen: Option<DataFrame>,
    pub isced: Option<DataFrame>,
    pub oorspronkelijke_vooropleidingen: Option<DataFrame>,
    pub lokale_namen: Option<DataFrame>,
}

impl ReferenceTables {
    /// Reads `<name>.parquet` or `<name>.csv` for every table from `dir`.
    ///
    /// `local_names` is a `;`-separated CSV file outside the reference
    /// directory; a missing file is logged and left out.
    pub fn load(dir: &Path, local_names: Option<&Path>) -> Result<Self> {
        let load = |name: &str| -> Result<Option<DataFrame>> {
            let table = read_named_table(dir, name)?;
            match &table {
                Some(df) => tracing::debug!(table = name, rows = df.height(), "Loaded reference table"),
                None => tracing::warn!(table = name, dir = %dir.display(), "Reference table not found"),
            }
            Ok(table)
        };

        let lokale_namen = match local_names {
            Some(path) if path.is_file() => Some(read_csv(path, b';')?),
            Some(path) => {
                tracing::warn!(path = %path.display(), "Local names file not found");
                None
            }
            None => None,
        };

        Ok(Self {
            vooropleidingen: load(DEC_VOPL)?,
            instellingen: load(DEC_BRINVESTIGINGSNUMMER)?,
            opleidingen: load(DEC_ISAT)?,
            isced: load(DEC_HO_ISCED)?,
            oorspronkelijke_vooropleidingen: load(DEC_VOOROPL)?,
            lokale_namen,
        })
    }

    /// Names of the tables that were not found.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (DEC_VOPL, self.vooropleidingen.is_none()),
            (DEC_BRINVESTIGINGSNUMMER, self.instellingen.is_none()),
            (DEC_ISAT, self.opleidingen.is_none()),
            (DEC_HO_ISCED, self.isced.is_none()),
            (DEC_VOOROPL, self.oorspronkelijke_vooropleidingen.is_none()),
            (LOCAL_NAMES, self.lokale_namen.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}
