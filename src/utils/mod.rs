//! Cross-platform utilities.

pub mod paths;
