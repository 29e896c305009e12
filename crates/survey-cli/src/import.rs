//! CSV import: maps headers to columns and parses records into rows.
//!
//! A header matches a core field by `field_id` or display header, and a
//! catalogue column by `field_id` or label (case-insensitive). Unmatched
//! headers are ignored. Row ids follow record order starting at 1.

use std::io::Read;

use anyhow::{Context, Result};
use survey_model::{CellValue, ColumnDefinition, CoreField, ObservationRow, RowId, ValueType};

#[derive(Debug, Clone)]
enum Target {
    Core(CoreField),
    Dynamic(ColumnDefinition),
}

impl Target {
    fn field_id(&self) -> &str {
        match self {
            Self::Core(field) => field.field_id(),
            Self::Dynamic(column) => &column.field_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportedRows {
    pub rows: Vec<ObservationRow>,
    /// Catalogue columns referenced by the headers, in header order.
    pub columns: Vec<ColumnDefinition>,
    pub ignored_headers: Vec<String>,
}

pub fn read_rows<R: Read>(reader: R, catalogue: &[ColumnDefinition]) -> Result<ImportedRows> {
    let mut source = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = source.headers().context("read CSV header")?.clone();
    let mut imported = ImportedRows::default();
    let targets: Vec<Option<Target>> = headers
        .iter()
        .map(|header| {
            let target = resolve_header(header, catalogue);
            match &target {
                Some(Target::Dynamic(column)) => imported.columns.push(column.clone()),
                Some(Target::Core(_)) => {}
                None => imported.ignored_headers.push(header.to_string()),
            }
            target
        })
        .collect();
    if !imported.ignored_headers.is_empty() {
        tracing::warn!(headers = ?imported.ignored_headers, "ignoring unknown CSV columns");
    }

    for (index, record) in source.records().enumerate() {
        let line = index + 2;
        let record = record.with_context(|| format!("read CSV line {line}"))?;
        let mut row = ObservationRow::empty(RowId::new(index as u64 + 1));
        for (target, raw) in targets.iter().zip(record.iter()) {
            let Some(target) = target else {
                continue;
            };
            row.set_value(target.field_id(), cell_value(target, raw))
                .with_context(|| format!("line {line}, column '{}'", target.field_id()))?;
        }
        imported.rows.push(row);
    }

    tracing::debug!(
        rows = imported.rows.len(),
        columns = imported.columns.len(),
        "read observation CSV"
    );
    Ok(imported)
}

fn resolve_header(header: &str, catalogue: &[ColumnDefinition]) -> Option<Target> {
    let header = header.trim();
    if let Some(field) = CoreField::parse(header)
        .or_else(|| CoreField::ALL.into_iter().find(|f| f.header().eq_ignore_ascii_case(header)))
    {
        return Some(Target::Core(field));
    }
    catalogue
        .iter()
        .find(|column| {
            column.field_id.eq_ignore_ascii_case(header)
                || column.header_label.eq_ignore_ascii_case(header)
        })
        .map(|column| Target::Dynamic(column.clone()))
}

fn cell_value(target: &Target, raw: &str) -> CellValue {
    let value = CellValue::from_text(raw);
    match target {
        Target::Dynamic(column)
            if matches!(column.value_type, ValueType::Number | ValueType::Integer) =>
        {
            value.as_f64().map_or(value, CellValue::Number)
        }
        _ => value,
    }
}
