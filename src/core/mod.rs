//! Core types shared across pdv modules.

pub mod error;

pub use error::PdvError;
