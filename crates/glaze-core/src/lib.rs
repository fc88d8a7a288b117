//! # glaze-core
//!
//! Core types for the Glaze AGSL previewer.
//! This crate contains the pieces shared by every Glaze crate: the error type
//! and the dialect configuration consumed by the uniform parser and the transpiler.

pub mod config;
pub mod error;

pub use config::{BuiltinUniform, DialectConfig, MacroAlias};
pub use error::{GlazeError, GlazeResult};
