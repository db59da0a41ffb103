//! Input hooks.

pub mod config_file;
pub mod range;
pub mod type_check;
