//! Core traits defined in `hooksett-core` and implemented by hook crates.

pub mod hook;

pub use hook::{InputHook, OutputHook, Verdict};
