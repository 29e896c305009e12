//! Terminal output for validation results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use survey_model::{ColumnDefinition, RowId};
use survey_table::BatchErrors;
use survey_validate::{Category, ValidationError};

use crate::report::ValidateResult;

pub fn print_summary(result: &ValidateResult) {
    println!("Rows: {}", result.source.display());
    println!("Survey: {}", result.survey);
    println!("Staged rows: {}", result.staged);
    match &result.report {
        Some(report) => println!("Committed rows: {}", report.saved.len()),
        None => println!(
            "Rejected: {} error(s) in {} row(s)",
            result.errors.error_count(),
            result.errors.len()
        ),
    }
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
    }
    if result.errors.is_empty() {
        return;
    }
    println!();
    println!("{}", error_table(&result.errors, &result.columns));
}

/// One table row per error, ordered by row id then rule order.
pub fn error_table(errors: &BatchErrors, columns: &[ColumnDefinition]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Category"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (row_id, row_errors) in errors.iter() {
        for error in row_errors {
            table.add_row(vec![
                Cell::new(row_id),
                Cell::new(column_label(columns, &error.field_id)),
                category_cell(error.category),
                Cell::new(&error.message),
            ]);
        }
    }
    table
}

/// Plain-text rendering, one error per line.
pub fn error_lines(errors: &BatchErrors, columns: &[ColumnDefinition]) -> String {
    errors
        .iter()
        .flat_map(|(row_id, row_errors)| {
            row_errors
                .iter()
                .map(move |error| error_line(row_id, error, columns))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn error_line(row_id: RowId, error: &ValidationError, columns: &[ColumnDefinition]) -> String {
    format!(
        "row {row_id} | {} | {} | {}",
        column_label(columns, &error.field_id),
        error.category.label(),
        error.message
    )
}

/// Column list for the `columns` command.
pub fn column_table(columns: &[ColumnDefinition]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Kind"),
    ]);
    apply_table_style(&mut table);
    for column in columns {
        table.add_row(vec![
            Cell::new(&column.field_id),
            Cell::new(&column.header_label),
            Cell::new(column.kind.label()),
        ]);
    }
    table
}

fn column_label<'a>(columns: &'a [ColumnDefinition], field_id: &'a str) -> &'a str {
    columns
        .iter()
        .find(|column| column.field_id == field_id)
        .map_or(field_id, |column| column.header_label.as_str())
}

fn category_cell(category: Category) -> Cell {
    let color = match category {
        Category::Structural | Category::Lookup => Color::Red,
        Category::Consistency | Category::Format => Color::Yellow,
        Category::Semantic => Color::Magenta,
    };
    Cell::new(category.label()).fg(color)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
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
