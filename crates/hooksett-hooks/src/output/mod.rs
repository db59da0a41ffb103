//! Output hooks.

pub mod experiment;
pub mod recorder;
pub mod traced;
