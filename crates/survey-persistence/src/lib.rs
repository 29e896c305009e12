//! Durable storage for observation table settings.
//!
//! The table engine never talks to a storage backend directly; it is handed
//! a [`SurveyStore`] and reads/writes JSON documents by survey id and key.
//!
//! - [`MemoryStore`] - process-local, for tests and throwaway sessions
//! - [`JsonFileStore`] - one JSON document per survey with atomic writes
//!
//! [`load`] and [`save`] add typed (serde) access on top of any store.

mod error;
mod file;
mod memory;
mod store;

pub use error::{PersistenceError, Result};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{SurveyStore, load, save};
