// Domain layer: leap-year rule, models and ports. Depends only on serde and the error type.

pub mod classifier;
pub mod model;
pub mod ports;
