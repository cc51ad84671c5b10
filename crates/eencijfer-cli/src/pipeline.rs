//! Batch orchestration behind the CLI commands.
//!
//! Raw files are decoded one by one; a file without a definition is
//! skipped, a failing file is reported, and the batch continues. Each asset is built and written independently, except
//! that cohorts need the enriched table.

use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{error, info, info_span, warn};

use eencijfer_core::{derive_cohorts, protect_tables, reshape_exam_grades};
use eencijfer_ingest::{
    ConverterRegistry, EXAM_MARKER, FixedWidthDecoder, IngestError, LayoutCatalog,
    STUDENT_MARKER, file_stem, find_exam_table, find_student_table, list_raw_files, read_table,
    write_table,
};
use eencijfer_model::columns::PERSOONSGEBONDEN_NUMMER;
use eencijfer_model::{ExportFormat, LayoutDefinition, PriorEducationRole};
use eencijfer_transform::{ReferenceTables, build_default_pipeline};

use crate::config::Config;
use crate::logging::redact_value;
use crate::types::{
    AssetSummary, AssetsResult, ConvertResult, FileSummary, InitResult, OutputStatus, QaMatch,
    QaReport,
};

/// Enriched student table.
pub const ENRICHED_ASSET: &str = "eencijfer";
/// One row per student per entry cohort.
pub const COHORT_ASSET: &str = "cohorten";
/// Final-exam grades in long format.
pub const EXAM_ASSET: &str = "eindexamencijfers";

/// Writes a default configuration and reports the raw files it points at.
pub fn init(config_path: &Path, force: bool) -> Result<InitResult> {
    let written = force || !config_path.exists();
    let config = if written {
        let config = Config::default();
        config.save(config_path)?;
        config
    } else {
        warn!(
            path = %config_path.display(),
            "Configuration exists, use --force to overwrite"
        );
        Config::load(config_path)?
    };

    let raw_files = list_raw_files(&config.source_dir).ok().map(|files| files.len());
    Ok(InitResult {
        config_path: config_path.to_path_buf(),
        written,
        source_dir: config.source_dir,
        raw_files,
    })
}

/// Decodes every raw file in `source_dir` and protects the student and
/// exam tables.
pub fn convert(config: &Config, use_column_converters: bool) -> Result<ConvertResult> {
    let catalog = LayoutCatalog::open(&config.import_definitions_dir).with_context(|| {
        format!(
            "failed to open definitions in {}",
            config.import_definitions_dir.display()
        )
    })?;
    let registry = ConverterRegistry::standard();
    let decoder = FixedWidthDecoder::new(&registry, use_column_converters);

    let raw_files = info_span!("discover", dir = %config.source_dir.display())
        .in_scope(|| list_raw_files(&config.source_dir))
        .with_context(|| format!("failed to list {}", config.source_dir.display()))?;
    if raw_files.is_empty() {
        warn!(dir = %config.source_dir.display(), "No raw files found");
    } else {
        info!(files = raw_files.len(), "Found raw files");
    }

    let start = Instant::now();
    let mut files = Vec::with_capacity(raw_files.len());
    let mut errors = Vec::new();
    for raw in &raw_files {
        let span = info_span!("decode", file = %raw.display());
        let _guard = span.enter();
        match decode_raw_file(&decoder, &catalog, raw, config) {
            Ok(summary) => files.push(summary),
            Err(IngestError::LayoutNotFound { .. }) => {
                warn!(
                    dir = %config.import_definitions_dir.display(),
                    "No definition for raw file, skipped"
                );
                files.push(FileSummary {
                    file: raw.clone(),
                    layout: None,
                    rows: 0,
                    columns: 0,
                    status: OutputStatus::Skipped("no definition".to_string()),
                });
            }
            Err(err) => {
                report_ingest_error(&err);
                errors.push(err.to_string());
                files.push(FileSummary {
                    file: raw.clone(),
                    layout: catalog.resolve(raw).map(|d| file_stem(d).to_string()),
                    rows: 0,
                    columns: 0,
                    status: OutputStatus::Failed(err.to_string()),
                });
            }
        }
    }
    info!(
        files = files.len(),
        skipped = files.iter().filter(|f| f.status.is_skipped()).count(),
        failed = errors.len(),
        duration_ms = start.elapsed().as_millis(),
        "Decoding complete"
    );

    let written: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| f.status.written_path().map(Path::to_path_buf))
        .collect();
    let protected = match info_span!("pseudonymize").in_scope(|| protect_outputs(config, &written))
    {
        Ok(paths) => paths,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Pseudonymization failed");
            errors.push(format!("pseudonymization: {err:#}"));
            Vec::new()
        }
    };

    Ok(ConvertResult {
        source_dir: config.source_dir.clone(),
        result_dir: config.result_dir.clone(),
        column_converters: decoder.uses_column_converters(),
        has_errors: !errors.is_empty(),
        files,
        protected,
        errors,
    })
}

/// Decodes one raw file and writes it to `result_dir` when it has rows.
pub fn decode_raw_file(
    decoder: &FixedWidthDecoder<'_>,
    catalog: &LayoutCatalog,
    raw: &Path,
    config: &Config,
) -> eencijfer_ingest::Result<FileSummary> {
    let layout = catalog.layout_for(raw)?;
    let mut df = decoder.decode_file(raw, &layout)?;
    let status = if df.height() == 0 {
        OutputStatus::Empty
    } else {
        OutputStatus::Written(write_table(
            &mut df,
            &config.result_dir,
            file_stem(raw),
            config.export_format,
        )?)
    };
    Ok(FileSummary {
        file: raw.to_path_buf(),
        layout: Some(layout.name.clone()),
        rows: df.height(),
        columns: df.width(),
        status,
    })
}

fn report_ingest_error(err: &IngestError) {
    error!(error = %err, "Decoding failed");
    if let IngestError::GarbageColumn { samples, .. } = err {
        for sample in samples {
            warn!(
                line = sample.line,
                leading = redact_value(&sample.leading),
                garbage = %sample.garbage,
                "Data beyond the layout"
            );
        }
    }
}

/// Applies local ids and pseudo-ids to the student and exam tables among
/// `written`, rewriting them in place. Returns the rewritten paths.
pub fn protect_outputs(config: &Config, written: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !config.remove_pii && !config.add_local_id {
        info!("PII removal and local ids disabled, tables kept as decoded");
        return Ok(Vec::new());
    }
    let mut targets: Vec<&PathBuf> = [find_student_table(written), find_exam_table(written)]
        .into_iter()
        .flatten()
        .collect();
    targets.dedup();
    if targets.is_empty() {
        warn!(
            student = STUDENT_MARKER,
            exam = EXAM_MARKER,
            "No student or exam table to pseudonymize"
        );
        return Ok(Vec::new());
    }

    let options = config.privacy_options()?;
    let tables = targets
        .iter()
        .map(|path| read_table(path).with_context(|| format!("failed to read {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    let protected = protect_tables(tables, PERSOONSGEBONDEN_NUMMER, &options, &mut rand::rng())?;

    let mut paths = Vec::with_capacity(protected.len());
    for (path, mut df) in targets.into_iter().zip(protected) {
        paths.push(write_table(
            &mut df,
            &config.result_dir,
            file_stem(path),
            config.export_format,
        )?);
    }
    Ok(paths)
}

/// Persisted tables of the given format in `dir`, sorted by name.
pub fn list_tables(dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut tables = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read {}", dir.display()))?
            .path();
        let matches_format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));
        if path.is_file() && matches_format {
            tables.push(path);
        }
    }
    tables.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(tables)
}

/// Builds the enriched, cohort and exam-grade assets.
pub fn create_assets(config: &Config) -> Result<AssetsResult> {
    let tables = list_tables(&config.result_dir, config.export_format)?;
    let student_path = find_student_table(&tables).with_context(|| {
        format!(
            "no student table (name containing '{STUDENT_MARKER}') in {}",
            config.result_dir.display()
        )
    })?;
    let students = read_table(student_path)
        .with_context(|| format!("failed to read {}", student_path.display()))?;
    let refs = ReferenceTables::load(config.reference_dir(), config.local_names_file.as_deref())?;
    let missing = refs.missing();
    if !missing.is_empty() {
        warn!(tables = %missing.join(", "), "Reference tables not found");
    }

    let mut assets = Vec::with_capacity(3);
    let mut steps = Vec::new();

    let pipeline = build_default_pipeline(PriorEducationRole::Hoogste);
    let enriched = info_span!("enrich", rows = students.height())
        .in_scope(|| pipeline.execute(students, &refs));
    match enriched {
        Ok((mut enriched, reports)) => {
            steps = reports;
            assets.push(write_asset(config, ENRICHED_ASSET, &mut enriched));
            match info_span!("cohorts").in_scope(|| derive_cohorts(&enriched)) {
                Ok(mut cohorts) => assets.push(write_asset(config, COHORT_ASSET, &mut cohorts)),
                Err(err) => assets.push(failed_asset(COHORT_ASSET, &err)),
            }
        }
        Err(err) => {
            assets.push(failed_asset(ENRICHED_ASSET, &err));
            assets.push(AssetSummary {
                name: COHORT_ASSET,
                rows: 0,
                columns: 0,
                status: OutputStatus::Skipped("enrichment failed".to_string()),
            });
        }
    }

    match find_exam_table(&tables) {
        Some(path) => {
            let grades =
                info_span!("exams", file = %path.display()).in_scope(|| -> Result<DataFrame> {
                    let exams = read_table(path)?;
                    Ok(reshape_exam_grades(
                        &exams,
                        refs.oorspronkelijke_vooropleidingen.as_ref(),
                    )?)
                });
            match grades {
                Ok(mut grades) => assets.push(write_asset(config, EXAM_ASSET, &mut grades)),
                Err(err) => assets.push(failed_asset(EXAM_ASSET, &format!("{err:#}"))),
            }
        }
        None => {
            warn!(
                dir = %config.result_dir.display(),
                marker = EXAM_MARKER,
                "No exam table found"
            );
            assets.push(AssetSummary {
                name: EXAM_ASSET,
                rows: 0,
                columns: 0,
                status: OutputStatus::Skipped("no exam table".to_string()),
            });
        }
    }

    Ok(AssetsResult {
        assets_dir: config.assets_dir.clone(),
        has_errors: assets.iter().any(|a| a.status.is_failed()),
        assets,
        steps,
    })
}

fn write_asset(config: &Config, name: &'static str, df: &mut DataFrame) -> AssetSummary {
    let (rows, columns) = (df.height(), df.width());
    let status = if rows == 0 {
        warn!(asset = name, "Asset has no rows, not written");
        OutputStatus::Empty
    } else {
        let written = info_span!("write", asset = name)
            .in_scope(|| write_table(df, &config.assets_dir, name, config.export_format));
        match written {
            Ok(path) => OutputStatus::Written(path),
            Err(err) => {
                error!(asset = name, error = %err, "Failed to write asset");
                OutputStatus::Failed(err.to_string())
            }
        }
    };
    AssetSummary {
        name,
        rows,
        columns,
        status,
    }
}

fn failed_asset(name: &'static str, err: &dyn Display) -> AssetSummary {
    error!(asset = name, error = %err, "Failed to build asset");
    AssetSummary {
        name,
        rows: 0,
        columns: 0,
        status: OutputStatus::Failed(err.to_string()),
    }
}

/// Matches raw files against definition files.
pub fn qa(config: &Config) -> Result<QaReport> {
    let catalog = LayoutCatalog::open(&config.import_definitions_dir).with_context(|| {
        format!(
            "failed to open definitions in {}",
            config.import_definitions_dir.display()
        )
    })?;
    let raw_files = list_raw_files(&config.source_dir)
        .with_context(|| format!("failed to list {}", config.source_dir.display()))?;

    let registry = ConverterRegistry::standard();
    let known: HashSet<&str> = registry.ids().collect();

    let matches: Vec<QaMatch> = raw_files
        .into_iter()
        .map(|raw_file| {
            let layout = match catalog.layout_for(&raw_file) {
                Ok(layout) => Some(layout),
                Err(IngestError::LayoutNotFound { .. }) => None,
                Err(err) => {
                    warn!(file = %raw_file.display(), error = %err, "Definition cannot be read");
                    None
                }
            };
            let unknown_converters = layout
                .iter()
                .flat_map(|l| &l.fields)
                .map(|f| f.converter.trim())
                .filter(|id| !id.is_empty() && !known.contains(id))
                .map(str::to_string)
                .collect();
            QaMatch {
                definition: catalog.resolve(&raw_file).map(Path::to_path_buf),
                record_width: layout.as_ref().map(LayoutDefinition::record_width),
                unknown_converters,
                raw_file,
            }
        })
        .collect();
    let used: HashSet<&Path> = matches
        .iter()
        .filter_map(|m| m.definition.as_deref())
        .collect();
    let unused = catalog
        .definitions()
        .iter()
        .filter(|d| !used.contains(d.as_path()))
        .cloned()
        .collect();

    Ok(QaReport { matches, unused })
}
