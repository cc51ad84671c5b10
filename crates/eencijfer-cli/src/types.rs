use std::path::{Path, PathBuf};

use eencijfer_transform::StepReport;

/// What happened to one output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    Written(PathBuf),
    /// No rows; nothing was written.
    Empty,
    /// Not attempted, with the reason.
    Skipped(String),
    Failed(String),
}

impl OutputStatus {
    pub fn written_path(&self) -> Option<&Path> {
        match self {
            OutputStatus::Written(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, OutputStatus::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, OutputStatus::Skipped(_))
    }
}

#[derive(Debug, Clone)]
pub struct FileSummary {
    pub file: PathBuf,
    pub layout: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub status: OutputStatus,
}

#[derive(Debug)]
pub struct ConvertResult {
    pub source_dir: PathBuf,
    pub result_dir: PathBuf,
    /// False when every column was read as text.
    pub column_converters: bool,
    pub files: Vec<FileSummary>,
    /// Tables rewritten with pseudo-ids.
    pub protected: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub has_errors: bool,
}

#[derive(Debug, Clone)]
pub struct AssetSummary {
    pub name: &'static str,
    pub rows: usize,
    pub columns: usize,
    pub status: OutputStatus,
}

#[derive(Debug)]
pub struct AssetsResult {
    pub assets_dir: PathBuf,
    pub assets: Vec<AssetSummary>,
    pub steps: Vec<StepReport>,
    pub has_errors: bool,
}

/// A raw file and the definition it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaMatch {
    pub raw_file: PathBuf,
    pub definition: Option<PathBuf>,
    /// Record width the definition describes, when it could be read.
    pub record_width: Option<usize>,
    /// Converter ids the registry does not know; read as text.
    pub unknown_converters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaReport {
    pub matches: Vec<QaMatch>,
    /// Definitions no raw file resolves to.
    pub unused: Vec<PathBuf>,
}

impl QaReport {
    pub fn unresolved(&self) -> impl Iterator<Item = &QaMatch> {
        self.matches.iter().filter(|m| m.definition.is_none())
    }
}

#[derive(Debug)]
pub struct InitResult {
    pub config_path: PathBuf,
    /// False when an existing file was kept.
    pub written: bool,
    pub source_dir: PathBuf,
    /// `None` when the source directory does not exist.
    pub raw_files: Option<usize>,
}
