//! # glaze-lang
//!
//! AGSL front end for the Glaze previewer.
//! Scans AGSL source for user uniforms, transpiles it to a GLSL ES 1.00
//! fragment shader for WebGL, and maps compiler diagnostics back onto the
//! user's own line numbers.

pub mod codegen;
pub mod defaults;
pub mod diagnostics;
pub mod lexer;
mod patterns;
mod rewrite;
pub mod transpiler;
pub mod uniforms;

pub use codegen::MaskMode;
pub use defaults::{default_value, UniformValue};
pub use diagnostics::{remap_diagnostics, remap_line, Warning, WarningKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use transpiler::{transpile, TranspileResult, Transpiler};
pub use uniforms::{parse_uniforms, Declaration, RawType, SemanticType, UniformParser};
