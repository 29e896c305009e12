//! Observation row validation.
//!
//! # Rule families
//!
//! | Order | Family | Category |
//! |---|---|---|
//! | 1 | Required core columns | Structural |
//! | 2 | Sampling hierarchy | Consistency |
//! | 3 | Date/time, coordinates | Format |
//! | 4 | Per-taxon measurements (async) | Semantic / Lookup |
//! | 5 | Environment columns | Semantic |
//!
//! Measurement definitions are fetched through the [`MeasurementLookup`]
//! port and cached per taxon for the session by [`MeasurementCache`].
//! Lookup failures surface as [`TransportError`], distinct from the
//! "taxon has no definitions" lookup issue.

pub mod checks;
mod issue;
mod lookup;
mod taxonomy;
mod validator;

pub use checks::required::RequiredColumn;
pub use issue::{Category, INVALID_TIME_MARKER, Issue, ValidationError};
pub use lookup::{ColumnSearch, MeasurementCache, MeasurementLookup, TransportError};
pub use taxonomy::{StaticTaxonomy, rank_columns};
pub use validator::{DEFAULT_CONCURRENCY, RowValidator};
