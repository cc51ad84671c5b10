use std::path::Path;

use anyhow::{Result, anyhow};

use eencijfer_cli::config::Config;
use eencijfer_cli::pipeline::{convert, create_assets, init, qa};
use eencijfer_cli::types::{AssetsResult, ConvertResult, InitResult, QaReport};

use crate::cli::{AssetsArgs, ConvertArgs, InitArgs};

pub fn run_init(config_path: &Path, args: &InitArgs) -> Result<InitResult> {
    init(config_path, args.force)
}

pub fn run_convert(config_path: &Path, args: &ConvertArgs) -> Result<ConvertResult> {
    let mut config = Config::load(config_path)?;
    if let Some(format) = args.export_format {
        config.export_format = format.into();
    }
    if let Some(remove_pii) = args.remove_pii() {
        config.remove_pii = remove_pii;
    }
    if let Some(add_local_id) = args.add_local_id() {
        config.add_local_id = add_local_id;
    }
    let use_column_converters = args
        .column_converters()
        .or(config.use_column_converters)
        .ok_or_else(|| {
            anyhow!(
                "column converters not configured: pass --use-column-converters or \
                 --no-column-converters, or set use_column_converters in {}",
                config_path.display()
            )
        })?;
    convert(&config, use_column_converters)
}

pub fn run_create_assets(config_path: &Path, args: &AssetsArgs) -> Result<AssetsResult> {
    let mut config = Config::load(config_path)?;
    if let Some(format) = args.export_format {
        config.export_format = format.into();
    }
    create_assets(&config)
}

pub fn run_qa(config_path: &Path) -> Result<QaReport> {
    qa(&Config::load(config_path)?)
}
