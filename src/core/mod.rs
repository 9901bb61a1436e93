pub mod analysis;
pub mod charts;
pub mod dataset;
pub mod etl;
pub mod export;
pub mod pipeline;

pub use crate::domain::model::{RawYearRow, TransformResult, YearRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
