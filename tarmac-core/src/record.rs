//! Types and traits for recording per-step and per-episode diagnostics.
//!
//! * [`Record`] - A container of key-value pairs
//! * [`RecordValue`] - Values that can be stored in a [`Record`]
//! * [`Recorder`] and [`AggregateRecorder`] - Destinations of records
//! * [`RecordStorage`] - Aggregation of stored records
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`LogRecorder`] - Aggregates records and prints them with `log`
//! * [`NullRecorder`] - Discards all records
//!
//! ```rust
//! use tarmac_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("reward", RecordValue::Scalar(0.0));
//! record.insert("expert_action", RecordValue::Array1(vec![0.25, 0.6]));
//! assert_eq!(record.get_array1("expert_action").unwrap(), vec![0.25, 0.6]);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
