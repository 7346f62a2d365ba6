use log::{debug, info};
use thiserror::Error;

use crate::ast::Program;
use crate::checker::TypeChecker;
use crate::cil::builder::{CilBuilder, CilError};
use crate::cil::verify::{CilVerifier, VerifyError};
use crate::diagnostics::DiagnosticCollection;
use crate::mips::emitter::{EmitError, MipsEmitter};
use crate::mips::program::MipsProgram;
use crate::semantic::ContextBuilder;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Semantic analysis rejected the program; no code was emitted.
    #[error("semantic analysis found {} error(s)", .0.len())]
    Diagnostics(DiagnosticCollection),
    #[error(transparent)]
    Lowering(#[from] CilError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    Emission(#[from] EmitError),
}

/// Runs the whole pipeline: context building, type checking, CIL lowering
/// and MIPS emission. Diagnostics from the first two stages are pooled; any
/// at all stop the pipeline before lowering.
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, program: &Program) -> Result<MipsProgram, CompileError> {
        info!("building class context for {} classes", program.classes.len());
        let (context, mut diagnostics) = ContextBuilder::build(program);

        info!("type checking");
        let (_scope, checker_diagnostics) = TypeChecker::check(program, &context);
        diagnostics.extend(checker_diagnostics);
        if diagnostics.has_errors() {
            info!("compilation stopped with {} diagnostics", diagnostics.len());
            return Err(CompileError::Diagnostics(diagnostics));
        }

        info!("lowering to CIL");
        let cil = CilBuilder::build(program, &context)?;
        CilVerifier::verify_program(&cil)?;
        debug!("cil verified:\n{}", crate::cil::debug::dump_program(&cil));

        info!("emitting MIPS");
        let mips = MipsEmitter::emit(&cil)?;
        Ok(mips)
    }

    /// Semantic analysis only: the accumulated diagnostics for a program,
    /// in source order, without generating code.
    pub fn analyze(&self, program: &Program) -> DiagnosticCollection {
        let (context, mut diagnostics) = ContextBuilder::build(program);
        let (_scope, checker_diagnostics) = TypeChecker::check(program, &context);
        diagnostics.extend(checker_diagnostics);
        diagnostics
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
