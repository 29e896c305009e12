//! Edit-state engine for the observation table.
//!
//! - [`ColumnRegistry`] - core plus runtime measurement/environment columns,
//!   persisted per survey
//! - [`RowStore`] - saved and staged rows, dirty and deletion flags, revert
//!   snapshots
//! - [`EditController`] - edit entry points and the validate-then-commit
//!   save batch
//!
//! # Saving
//!
//! ```text
//! begin_save ──► SaveBatch::run ──► finish_save
//!   lock rows     validate all rows    commit, or attach errors
//!                 sink (only if valid)  and keep rows dirty
//! ```
//!
//! A batch commits all of its rows or none of them.

mod config;
mod controller;
mod error;
mod registry;
mod save;
mod sink;
mod snapshot;
mod store;
mod tracker;

pub use config::TableConfig;
pub use controller::EditController;
pub use error::{BatchErrors, EditError, SaveError};
pub use registry::{ColumnRegistry, DYNAMIC_COLUMNS_KEY, HIDDEN_COLUMNS_KEY};
pub use save::{SaveBatch, SaveOutcome, SaveReport};
pub use sink::{MemorySink, ObservationSink};
pub use snapshot::{RowStatus, RowView, TableSnapshot};
pub use store::{DeleteOutcome, RevertSummary, RowEntry, RowOrigin, RowStore};
pub use tracker::{BatchId, SaveTracker};
