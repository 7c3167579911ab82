pub mod csv_writer;
pub mod dispatcher;
pub mod engine;
pub mod flatten;
pub mod validator;

pub use crate::domain::model::{FlatRecord, Message, StreamSchema};
pub use crate::domain::ports::{RecordSink, RecordValidator, ValidatorFactory};
pub use crate::utils::error::Result;
