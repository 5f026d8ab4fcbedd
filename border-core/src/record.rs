//! Types and traits for recording values emitted by environments.
//!
//! Every call of [`Env::step`](crate::Env::step) returns a [`Record`] besides the
//! [`Step`](crate::Step) object. Wrappers of environments add their own entries
//! to the record of the inner environment, so the record of a stacked environment
//! holds values from all of its layers.
//!
//! ```rust
//! use border_core::record::{Record, RecordValue};
//!
//! let obs = vec![1f32, 2.0, 3.0, 4.0, 5.0];
//!
//! let mut record = Record::from_scalar("reward", -1.0);
//! record.insert("obs", RecordValue::Array1(obs));
//! assert_eq!(record.get_scalar("reward").unwrap(), -1.0);
//! ```
//!
//! Records are handed to a [`Recorder`], which decides where they go.
//! [`BufferedRecorder`] keeps them in memory and [`NullRecorder`] discards them.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
