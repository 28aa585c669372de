// src/roc/mod.rs

pub mod confusion;
pub mod notable;
pub mod sweep;

pub use notable::NotableKind;
pub use sweep::{run_sweep, OperatingPoint, SweepResult};
