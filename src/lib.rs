pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;

pub use core::{etl::EtlEngine, pipeline::LeapYearPipeline};
pub use domain::classifier::{classify, is_leap, normalize};
pub use domain::model::{Classification, LeapReason, YearRecord};
pub use utils::error::{EtlError, Result};
