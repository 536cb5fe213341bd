//! Shared helpers for bundler phases.

pub mod fs;
