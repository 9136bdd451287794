//! News Cleaner Keyword Compiler
//!
//! This crate compiles a raw keyword list into boundary-aware patterns that
//! tolerate inflected word forms: Latin possessives, Russian/Ukrainian noun
//! case endings and adjective declensions.

pub mod builder;
pub mod classify;
pub mod tables;

pub use builder::{compile_keyword, compile_keywords, CompileError, InflectionCompiler};
pub use classify::classify;
