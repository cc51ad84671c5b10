//! Pseudonymization of person identifiers and removal of direct identifiers.
//!
//! A [`PseudoIdMapping`] is built once per run from the student table and
//! applied to every table that carries the identifier. The mapping is a
//! random permutation of `1..=n` written as seven digits, so a rerun gives
//! every person a different pseudo-id.

use std::collections::{HashMap, HashSet};

use polars::prelude::{Column, DataFrame};
use rand::Rng;
use rand::seq::SliceRandom;

use eencijfer_common::{LeftJoin, column, string_column, string_values};
use eencijfer_model::columns::PII_COLUMNS;

use crate::error::{CoreError, Result};

/// Digits in a pseudo-id.
pub const PSEUDO_ID_WIDTH: usize = 7;

/// Largest number of distinct identifiers a seven-digit pseudo-id can cover.
pub const MAX_PSEUDO_IDS: usize = 9_999_999;

/// One-to-one mapping from identifier to pseudo-id.
#[derive(Debug, Clone, Default)]
pub struct PseudoIdMapping {
    ids: HashMap<String, String>,
}

impl PseudoIdMapping {
    /// Assigns a pseudo-id to every distinct, non-empty value of `identifier`.
    pub fn build<R: Rng + ?Sized>(df: &DataFrame, identifier: &str, rng: &mut R) -> Result<Self> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = string_values(df, identifier)?
            .into_iter()
            .flatten()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if distinct.len() > MAX_PSEUDO_IDS {
            return Err(CoreError::TooManyIdentifiers {
                count: distinct.len(),
                max: MAX_PSEUDO_IDS,
            });
        }

        let mut numbers: Vec<usize> = (1..=distinct.len()).collect();
        numbers.shuffle(rng);

        let mut assigned = HashSet::with_capacity(numbers.len());
        let mut ids = HashMap::with_capacity(numbers.len());
        for (id, number) in distinct.into_iter().zip(numbers) {
            let pseudo = format!("{number:0width$}", width = PSEUDO_ID_WIDTH);
            if !assigned.insert(pseudo.clone()) {
                return Err(CoreError::DuplicatePseudoId { id: pseudo });
            }
            ids.insert(id, pseudo);
        }
        tracing::info!(identifiers = ids.len(), "Pseudo-id mapping created");
        Ok(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.ids.get(id.trim()).map(String::as_str)
    }

    /// Replaces `identifier` in place with its pseudo-id.
    ///
    /// The column keeps its position and becomes text. Identifiers missing
    /// from the mapping become empty and are reported.
    pub fn apply(&self, df: &DataFrame, identifier: &str) -> Result<DataFrame> {
        let original = string_values(df, identifier)?;
        let mut unmapped = 0usize;
        let pseudo: Vec<Option<String>> = original
            .iter()
            .map(|id| {
                let mapped = id.as_deref().and_then(|id| self.get(id)).map(str::to_string);
                if id.is_some() && mapped.is_none() {
                    unmapped += 1;
                }
                mapped
            })
            .collect();
        if unmapped > 0 {
            tracing::warn!(
                column = identifier,
                rows = unmapped,
                "Identifiers without a pseudo-id were emptied"
            );
        }

        let mut result = df.clone();
        result.with_column(string_column(identifier, pseudo))?;
        Ok(result)
    }
}

/// Empties the direct-identifier columns (`Onderwijsnummer`,
/// `Burgerservicenummer`) that are present.
pub fn scrub_pii(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    let mut scrubbed = Vec::new();
    for name in PII_COLUMNS {
        let Ok(existing) = column(df, name) else {
            continue;
        };
        let empty = Column::full_null(name.into(), df.height(), existing.dtype());
        result.with_column(empty)?;
        scrubbed.push(name);
    }
    if scrubbed.is_empty() {
        tracing::debug!("No PII columns to empty");
    } else {
        tracing::info!(columns = %scrubbed.join(", "), "Emptied PII columns");
    }
    Ok(result)
}

/// An institution table that maps the identifier to a local id.
#[derive(Debug, Clone)]
pub struct LocalIdTable {
    pub table: DataFrame,
    pub left_on: String,
    pub right_on: String,
}

/// Adds local id columns with a row-preserving left join.
pub fn attach_local_id(df: &DataFrame, local: &LocalIdTable) -> Result<DataFrame> {
    tracing::info!(
        left_on = %local.left_on,
        right_on = %local.right_on,
        "Adding local ids"
    );
    let left_on = [local.left_on.as_str()];
    let right_on = [local.right_on.as_str()];
    Ok(LeftJoin::new("local_id", &left_on, &right_on).execute(df, &local.table)?)
}

/// What to do with identifiers before tables are written.
#[derive(Debug, Clone, Default)]
pub struct PrivacyOptions {
    /// Replace the person identifier with a pseudo-id and empty PII columns.
    pub remove_pii: bool,
    /// Attach local ids before pseudonymization.
    pub local_id: Option<LocalIdTable>,
}

impl PrivacyOptions {
    /// Local ids survive pseudonymization, so the combination still
    /// identifies persons.
    pub fn leaks_local_id(&self) -> bool {
        self.remove_pii && self.local_id.is_some()
    }
}

/// Applies local ids, pseudonymization and PII removal to a set of tables
/// that share `identifier`.
///
/// The mapping is built from the first table. Returns the tables in input
/// order.
pub fn protect_tables<R: Rng + ?Sized>(
    tables: Vec<DataFrame>,
    identifier: &str,
    options: &PrivacyOptions,
    rng: &mut R,
) -> Result<Vec<DataFrame>> {
    let mut tables = match &options.local_id {
        Some(local) => tables
            .iter()
            .map(|df| attach_local_id(df, local))
            .collect::<Result<Vec<_>>>()?,
        None => tables,
    };

    if !options.remove_pii {
        return Ok(tables);
    }
    if options.leaks_local_id() {
        tracing::warn!("Local ids are kept after pseudonymization; the data still contains PII");
    }

    let Some(first) = tables.first() else {
        return Ok(tables);
    };
    let mapping = PseudoIdMapping::build(first, identifier, rng)?;
    for df in &mut tables {
        *df = scrub_pii(&mapping.apply(df, identifier)?)?;
    }
    Ok(tables)
}
