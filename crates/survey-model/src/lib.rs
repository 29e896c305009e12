//! Data model for the survey observation table.
//!
//! Rows are owned by the table's row store; everything here is plain data
//! with serde support so rows and column sets can be persisted and
//! exchanged with external collaborators.

pub mod column;
pub mod error;
pub mod ids;
pub mod measurement;
pub mod row;
pub mod value;

pub use column::{
    ColumnDefinition, ColumnKind, CoreField, ValueConstraint, ValueType, core_columns,
};
pub use error::{ModelError, Result};
pub use ids::{RowId, SurveyId, TaxonId};
pub use measurement::{
    Bounds, MeasurementOption, QualitativeDefinition, QuantitativeDefinition, TaxonMeasurements,
};
pub use row::{ObservationRow, render_cell};
pub use value::{CellValue, format_numeric};
