//! Types and traits for recording training metrics.
//!
//! * [`Record`] - a container of key-value pairs of various data types
//! * [`RecordValue`] - the values that can be stored in a [`Record`]
//! * [`Recorder`] - the interface of metric sinks
//! * [`BufferedRecorder`] - keeps records in memory
//!
//! ```rust
//! use blob_dqn_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("reward", RecordValue::Scalar(-1.0));
//! record.insert("step_count", RecordValue::Scalar(600.0));
//! assert_eq!(record.get_scalar("reward").unwrap(), -1.0);
//! ```
mod base;
mod buffered_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use recorder::Recorder;
