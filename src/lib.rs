pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{TargetConfig, TargetSettings};
pub use crate::core::{
    csv_writer::{CsvDialect, CsvFileSink},
    dispatcher::{LineDispatcher, RunState, RunSummary},
    engine::TargetEngine,
    flatten::flatten,
    validator::{Draft4ValidatorFactory, PermissiveValidatorFactory},
};
pub use utils::error::{Result, TargetError};
