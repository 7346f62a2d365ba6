use std::collections::HashSet;

use thiserror::Error;

use crate::cil::instr::CilInstruction;
use crate::cil::program::{CilFunction, CilProgram};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("function '{function}' references undeclared name '{name}'")]
    UndeclaredName { function: String, name: String },
    #[error("function '{function}' jumps to unknown label '{label}'")]
    UnknownLabel { function: String, label: String },
}

pub struct CilVerifier;

impl CilVerifier {
    pub fn verify_program(program: &CilProgram) -> Result<(), VerifyError> {
        for function in &program.code {
            Self::verify_function(function)?;
        }
        Ok(())
    }

    /// Every name an instruction references must be a declared local or
    /// parameter, and every jump target must be a label of the same
    /// function.
    pub fn verify_function(function: &CilFunction) -> Result<(), VerifyError> {
        let declared: HashSet<&str> = function
            .params
            .iter()
            .chain(function.locals.iter())
            .map(String::as_str)
            .collect();
        let labels: HashSet<&str> = function
            .instructions
            .iter()
            .filter_map(|i| match i {
                CilInstruction::Label { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();

        for instruction in &function.instructions {
            for name in referenced_names(instruction) {
                if !declared.contains(name) {
                    return Err(VerifyError::UndeclaredName {
                        function: function.name.clone(),
                        name: name.to_string(),
                    });
                }
            }
            if let Some(label) = jump_target(instruction) {
                if !labels.contains(label) {
                    return Err(VerifyError::UnknownLabel {
                        function: function.name.clone(),
                        label: label.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn referenced_names(instruction: &CilInstruction) -> Vec<&str> {
    match instruction {
        CilInstruction::Load { dest, .. } => vec![dest],
        CilInstruction::Assign { dest, src } | CilInstruction::Copy { dest, src } => {
            vec![dest, src]
        }
        CilInstruction::Plus { dest, left, right }
        | CilInstruction::Minus { dest, left, right }
        | CilInstruction::Star { dest, left, right }
        | CilInstruction::Div { dest, left, right }
        | CilInstruction::Less { dest, left, right }
        | CilInstruction::LessEq { dest, left, right } => vec![dest, left, right],
        CilInstruction::Allocate { dest, .. } => vec![dest],
        CilInstruction::GetAttrib { dest, instance, .. } => vec![dest, instance],
        CilInstruction::SetAttrib { instance, value, .. } => vec![instance, value],
        CilInstruction::StaticCall { dest, .. } => vec![dest],
        CilInstruction::DynamicCall { dest, instance, .. } => vec![dest, instance],
        CilInstruction::TypeOf { dest, instance } | CilInstruction::TypeName { dest, instance } => {
            vec![dest, instance]
        }
        CilInstruction::Arg { name } => vec![name],
        CilInstruction::Return { value } => value.iter().map(String::as_str).collect(),
        CilInstruction::GotoIf { cond, .. } => vec![cond],
        CilInstruction::Goto { .. }
        | CilInstruction::Label { .. }
        | CilInstruction::RuntimeError { .. }
        | CilInstruction::Comment { .. } => vec![],
    }
}

fn jump_target(instruction: &CilInstruction) -> Option<&str> {
    match instruction {
        CilInstruction::Goto { label } | CilInstruction::GotoIf { label, .. } => Some(label),
        _ => None,
    }
}
