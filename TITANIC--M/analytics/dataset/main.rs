//! Passenger dataset: record types, CSV loading and session caching.

/// Once-initialized dataset cache.
pub mod cache;
/// CSV loader and load errors.
pub mod loader;
/// Passenger record and table types.
pub mod record;

pub use cache::DatasetCache;
pub use loader::{load_passengers, parse_passengers, DatasetError, REQUIRED_COLUMNS};
pub use record::{PassengerClass, PassengerRecord, PassengerTable, Sex};
