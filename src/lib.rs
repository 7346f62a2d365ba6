//! coolc core library
//!
//! Semantic analysis, CIL lowering and MIPS emission for the COOL language.
//! Lexing, parsing and the CLI driver live outside this crate; the pipeline
//! starts from an already-constructed AST.

pub mod ast;
pub mod checker;
pub mod cil;
pub mod compiler;
pub mod diagnostics;
pub mod mips;
pub mod semantic;
