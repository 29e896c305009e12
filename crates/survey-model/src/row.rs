#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::CoreField;
use crate::error::{ModelError, Result};
use crate::ids::{RowId, TaxonId};
use crate::value::{CellValue, format_numeric};

/// One wildlife observation record.
///
/// Core fields are typed; measurement and environment values live in
/// `dynamic_values`, keyed by column `field_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub row_id: RowId,
    #[serde(default)]
    pub itis_tsn: Option<TaxonId>,
    #[serde(default)]
    pub survey_sample_site_id: Option<u64>,
    #[serde(default)]
    pub survey_sample_method_id: Option<u64>,
    #[serde(default)]
    pub survey_sample_period_id: Option<u64>,
    #[serde(default)]
    pub observation_date: Option<String>,
    #[serde(default)]
    pub observation_time: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub dynamic_values: BTreeMap<String, CellValue>,
}

impl ObservationRow {
    /// A row with every field empty.
    pub fn empty(row_id: RowId) -> Self {
        Self {
            row_id,
            itis_tsn: None,
            survey_sample_site_id: None,
            survey_sample_method_id: None,
            survey_sample_period_id: None,
            observation_date: None,
            observation_time: None,
            latitude: None,
            longitude: None,
            count: None,
            dynamic_values: BTreeMap::new(),
        }
    }

    /// Uniform read access: core fields are rendered as cells, dynamic
    /// fields are looked up in `dynamic_values`.
    pub fn value(&self, field_id: &str) -> CellValue {
        match CoreField::parse(field_id) {
            Some(field) => self.core_value(field),
            None => self
                .dynamic_values
                .get(field_id)
                .cloned()
                .unwrap_or(CellValue::Missing),
        }
    }

    pub fn core_value(&self, field: CoreField) -> CellValue {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map_or(CellValue::Missing, CellValue::from_text)
        };
        let id = |value: Option<u64>| value.map_or(CellValue::Missing, |v| CellValue::Number(v as f64));
        match field {
            CoreField::ItisTsn => id(self.itis_tsn.map(TaxonId::get)),
            CoreField::SurveySampleSiteId => id(self.survey_sample_site_id),
            CoreField::SurveySampleMethodId => id(self.survey_sample_method_id),
            CoreField::SurveySamplePeriodId => id(self.survey_sample_period_id),
            CoreField::ObservationDate => text(&self.observation_date),
            CoreField::ObservationTime => text(&self.observation_time),
            CoreField::Latitude => self.latitude.map_or(CellValue::Missing, CellValue::Number),
            CoreField::Longitude => self.longitude.map_or(CellValue::Missing, CellValue::Number),
            CoreField::Count => self
                .count
                .map_or(CellValue::Missing, |v| CellValue::Number(v as f64)),
        }
    }

    /// Write a cell. Core fields are converted to their typed form;
    /// writing `Missing` clears the field.
    pub fn set_value(&mut self, field_id: &str, value: CellValue) -> Result<()> {
        let Some(field) = CoreField::parse(field_id) else {
            if value.is_missing() {
                self.dynamic_values.remove(field_id);
            } else {
                self.dynamic_values.insert(field_id.to_string(), value);
            }
            return Ok(());
        };
        match field {
            CoreField::ItisTsn => self.itis_tsn = parse_id(field, &value)?.map(TaxonId::new),
            CoreField::SurveySampleSiteId => self.survey_sample_site_id = parse_id(field, &value)?,
            CoreField::SurveySampleMethodId => {
                self.survey_sample_method_id = parse_id(field, &value)?;
            }
            CoreField::SurveySamplePeriodId => {
                self.survey_sample_period_id = parse_id(field, &value)?;
            }
            CoreField::ObservationDate => self.observation_date = value.as_text(),
            CoreField::ObservationTime => self.observation_time = value.as_text(),
            CoreField::Latitude => self.latitude = parse_number(field, &value)?,
            CoreField::Longitude => self.longitude = parse_number(field, &value)?,
            CoreField::Count => {
                self.count = parse_integer(field, &value)?;
            }
        }
        Ok(())
    }

    /// Drop the given dynamic fields from this row.
    pub fn strip_fields<'a>(&mut self, field_ids: impl IntoIterator<Item = &'a str>) {
        for field_id in field_ids {
            self.dynamic_values.remove(field_id);
        }
    }
}

fn invalid(field: CoreField, value: &CellValue, expected: &'static str) -> ModelError {
    ModelError::InvalidValue {
        field: field.field_id().to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_number(field: CoreField, value: &CellValue) -> Result<Option<f64>> {
    if value.is_missing() {
        return Ok(None);
    }
    value
        .as_f64()
        .map(Some)
        .ok_or_else(|| invalid(field, value, "a number"))
}

fn parse_integer(field: CoreField, value: &CellValue) -> Result<Option<i64>> {
    let Some(number) = parse_number(field, value)? else {
        return Ok(None);
    };
    if number.fract() != 0.0 || number.abs() > i64::MAX as f64 {
        return Err(invalid(field, value, "a whole number"));
    }
    Ok(Some(number as i64))
}

fn parse_id(field: CoreField, value: &CellValue) -> Result<Option<u64>> {
    let Some(number) = parse_number(field, value)? else {
        return Ok(None);
    };
    if number.fract() != 0.0 || number < 0.0 || number > u64::MAX as f64 {
        return Err(invalid(field, value, "a positive identifier"));
    }
    Ok(Some(number as u64))
}

/// Render one cell as plain text (blank when missing).
pub fn render_cell(row: &ObservationRow, field_id: &str) -> String {
    match row.value(field_id) {
        CellValue::Number(number) => format_numeric(number),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_types_core_fields() {
        let mut row = ObservationRow::empty(RowId::new(1));
        row.set_value("itis_tsn", CellValue::from_text("2065")).unwrap();
        row.set_value("latitude", CellValue::Number(49.5)).unwrap();
        row.set_value("count", CellValue::from_text("3")).unwrap();

        assert_eq!(row.itis_tsn, Some(TaxonId::new(2065)));
        assert_eq!(row.latitude, Some(49.5));
        assert_eq!(row.count, Some(3));
    }

    #[test]
    fn set_value_rejects_fractional_count() {
        let mut row = ObservationRow::empty(RowId::new(1));
        let err = row
            .set_value("count", CellValue::from_text("2.5"))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidValue { .. }));
        assert_eq!(row.count, None);
    }

    #[test]
    fn missing_clears_dynamic_cell() {
        let mut row = ObservationRow::empty(RowId::new(1));
        row.set_value("agent_count", CellValue::Number(4.0)).unwrap();
        assert_eq!(row.value("agent_count"), CellValue::Number(4.0));

        row.set_value("agent_count", CellValue::Missing).unwrap();
        assert!(row.dynamic_values.is_empty());
    }

    #[test]
    fn render_cell_formats_ids_without_decimals() {
        let mut row = ObservationRow::empty(RowId::new(1));
        row.itis_tsn = Some(TaxonId::new(180703));
        assert_eq!(render_cell(&row, "itis_tsn"), "180703");
        assert_eq!(render_cell(&row, "observation_date"), "");
    }
}
