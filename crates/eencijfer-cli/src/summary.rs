use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use eencijfer_cli::types::{AssetsResult, ConvertResult, InitResult, OutputStatus, QaReport};
use eencijfer_ingest::file_stem;

pub fn print_init(result: &InitResult) {
    if result.written {
        println!("Configuration written: {}", result.config_path.display());
    } else {
        println!(
            "Configuration kept: {} (use --force to overwrite)",
            result.config_path.display()
        );
    }
    match result.raw_files {
        Some(0) | None => {
            println!(
                "No eencijfer files found at {}. Move them there or edit the configuration.",
                result.source_dir.display()
            );
        }
        Some(count) => println!("Raw files in {}: {count}", result.source_dir.display()),
    }
}

pub fn print_convert_summary(result: &ConvertResult) {
    println!("Source: {}", result.source_dir.display());
    println!("Output: {}", result.result_dir.display());
    if !result.column_converters {
        println!("Column converters: off, every column read as text");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Layout"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let mut total_rows = 0usize;
    for file in &result.files {
        total_rows += file.rows;
        let name = file
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(name).fg(Color::Blue).add_attribute(Attribute::Bold),
            file.layout.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(file.rows),
            Cell::new(file.columns),
            status_cell(&file.status),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if !result.protected.is_empty() {
        println!("Pseudonymized:");
        for path in &result.protected {
            println!("- {}", path.display());
        }
    }
    print_errors(&result.errors);
}

pub fn print_assets_summary(result: &AssetsResult) {
    println!("Assets: {}", result.assets_dir.display());
    let mut steps = Table::new();
    steps.set_header(vec![header_cell("Step"), header_cell("Added columns")]);
    apply_table_style(&mut steps);
    for report in &result.steps {
        let added = if report.skipped {
            Cell::new("skipped").fg(Color::Yellow)
        } else if report.added.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(report.added.join(", "))
        };
        steps.add_row(vec![Cell::new(&report.step), added]);
    }
    if !result.steps.is_empty() {
        println!("{steps}");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Asset"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for asset in &result.assets {
        table.add_row(vec![
            Cell::new(asset.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(asset.rows),
            Cell::new(asset.columns),
            status_cell(&asset.status),
        ]);
    }
    println!("{table}");
}

pub fn print_qa(report: &QaReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Raw file"),
        header_cell("Definition"),
        header_cell("Width"),
        header_cell("Unknown converters"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for m in &report.matches {
        let definition = match &m.definition {
            Some(path) => Cell::new(file_name(path)).fg(Color::Green),
            None => Cell::new("missing").fg(Color::Red),
        };
        let converters = if m.unknown_converters.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(m.unknown_converters.join(", ")).fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(file_name(&m.raw_file)),
            definition,
            m.record_width.map_or_else(|| dim_cell("-"), Cell::new),
            converters,
        ]);
    }
    for path in &report.unused {
        table.add_row(vec![
            dim_cell("-"),
            Cell::new(format!("{} (unused)", file_stem(path))).fg(Color::DarkGrey),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    println!("{table}");
    let unresolved = report.unresolved().count();
    if unresolved > 0 {
        eprintln!("{unresolved} raw file(s) without a definition");
    }
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("Errors:");
    for error in errors {
        eprintln!("- {error}");
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn status_cell(status: &OutputStatus) -> Cell {
    match status {
        OutputStatus::Written(path) => Cell::new(file_name(path)).fg(Color::Green),
        OutputStatus::Empty => Cell::new("empty, not written").fg(Color::Yellow),
        OutputStatus::Skipped(reason) => Cell::new(format!("skipped: {reason}")).fg(Color::Yellow),
        OutputStatus::Failed(message) => Cell::new(message).fg(Color::Red),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
