//! Utility modules for fixlens

pub mod permissions;
pub mod timing;

pub use timing::{format_duration, RunTiming, Timer};
