//! Layout catalog: definition files indexed by stem.
//!
//! A raw file resolves to the definition with the same stem (ignoring case).
//! Without an exact match, a raw file whose stem contains a marker falls back
//! to the first definition whose stem starts with that marker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use eencijfer_model::{LayoutDefinition, LayoutField};

use crate::discovery::file_stem;
use crate::error::{IngestError, Result};

/// Markers tried in order for the prefix fallback.
pub const LAYOUT_MARKERS: [&str; 2] = ["EV", "VAKHAV"];

/// Index of the definition files in one directory.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    dir: PathBuf,
    /// Definition paths sorted by file name.
    definitions: Vec<PathBuf>,
}

impl LayoutCatalog {
    /// Indexes every `*.csv` definition in `dir`.
    ///
    /// Two definitions whose stems differ only in case are rejected.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut definitions = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                definitions.push(path);
            }
        }
        definitions.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut stems: BTreeMap<String, &PathBuf> = BTreeMap::new();
        for path in &definitions {
            let stem = file_stem(path).to_lowercase();
            if let Some(first) = stems.insert(stem.clone(), path) {
                return Err(IngestError::DuplicateDefinition {
                    stem,
                    first: first.clone(),
                    second: path.clone(),
                });
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            definitions = definitions.len(),
            "Indexed definition files"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            definitions,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn definitions(&self) -> &[PathBuf] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Finds the definition file for a raw file, if any.
    pub fn resolve(&self, raw_file: &Path) -> Option<&Path> {
        let stem = file_stem(raw_file);
        let exact = self
            .definitions
            .iter()
            .find(|d| file_stem(d).eq_ignore_ascii_case(stem));
        if let Some(found) = exact {
            return Some(found.as_path());
        }

        for marker in LAYOUT_MARKERS {
            if !stem.contains(marker) {
                continue;
            }
            if let Some(found) = self
                .definitions
                .iter()
                .find(|d| file_stem(d).starts_with(marker))
            {
                tracing::debug!(
                    file = %raw_file.display(),
                    definition = %found.display(),
                    marker,
                    "Resolved definition by marker"
                );
                return Some(found.as_path());
            }
        }
        None
    }

    /// Resolves and loads the layout for a raw file.
    pub fn layout_for(&self, raw_file: &Path) -> Result<LayoutDefinition> {
        let definition = self
            .resolve(raw_file)
            .ok_or_else(|| IngestError::LayoutNotFound {
                file: raw_file.to_path_buf(),
            })?;
        load_definition(definition)
    }
}

/// Reads one definition file.
///
/// Header columns are `Label`, `StartingPosition`, `NumberOfPositions` and
/// `Converter`; cells are trimmed and a UTF-8 BOM is ignored.
pub fn load_definition(path: &Path) -> Result<LayoutDefinition> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let fields = reader
        .deserialize::<LayoutField>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| IngestError::DefinitionParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(LayoutDefinition::new(file_stem(path), fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "Label,StartingPosition,NumberOfPositions,Converter\n").unwrap();
        path
    }

    #[test]
    fn exact_stem_wins_over_marker() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "EV_generic.csv");
        let exact = touch(dir.path(), "ev299xx23.csv");
        let catalog = LayoutCatalog::open(dir.path()).unwrap();
        assert_eq!(
            catalog.resolve(Path::new("/raw/EV299XX23.asc")),
            Some(exact.as_path())
        );
    }

    #[test]
    fn marker_falls_back_to_first_sorted_definition() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "VAKHAVW_b.csv");
        let first = touch(dir.path(), "VAKHAVW_a.csv");
        let catalog = LayoutCatalog::open(dir.path()).unwrap();
        assert_eq!(
            catalog.resolve(Path::new("DUO_VAKHAVW_2023.asc")),
            Some(first.as_path())
        );
    }

    #[test]
    fn unknown_file_is_not_resolved() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "EV_generic.csv");
        let catalog = LayoutCatalog::open(dir.path()).unwrap();
        assert!(catalog.resolve(Path::new("Dec_isat.asc")).is_none());
        assert!(matches!(
            catalog.layout_for(Path::new("Dec_isat.asc")),
            Err(IngestError::LayoutNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_stems_are_rejected() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "EV.csv");
        touch(dir.path(), "ev.CSV");
        assert!(matches!(
            LayoutCatalog::open(dir.path()),
            Err(IngestError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn load_definition_trims_and_skips_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("EV.csv");
        fs::write(
            &path,
            "\u{feff}Label,StartingPosition,NumberOfPositions,Converter\n\
             PersoonsgebondenNummer, 1, 9, convert_to_int64\n\
             Geslacht,10,1,\n",
        )
        .unwrap();
        let layout = load_definition(&path).unwrap();
        assert_eq!(layout.name, "EV");
        assert_eq!(
            layout.fields,
            vec![
                LayoutField::new("PersoonsgebondenNummer", 1, 9, "convert_to_int64"),
                LayoutField::new("Geslacht", 10, 1, ""),
            ]
        );
    }
}
