use std::fmt;

use crate::mips::data::MipsData;
use crate::mips::instr::MipsInstruction;

/// A labeled instruction sequence in the `.text` segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MipsProcedure {
    pub label: String,
    pub instructions: Vec<MipsInstruction>,
}

impl MipsProcedure {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
        }
    }
}

impl fmt::Display for MipsProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for instruction in &self.instructions {
            if instruction.is_label() {
                writeln!(f, "{}", instruction)?;
            } else {
                writeln!(f, "  {}", instruction)?;
            }
        }
        Ok(())
    }
}

/// A complete program: `.data` entries followed by `.text` procedures.
/// `Display` produces SPIM/MARS-compatible assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MipsProgram {
    pub data: Vec<MipsData>,
    pub text: Vec<MipsProcedure>,
}

impl MipsProgram {
    pub fn procedure(&self, label: &str) -> Option<&MipsProcedure> {
        self.text.iter().find(|p| p.label == label)
    }

    pub fn datum(&self, label: &str) -> Option<&MipsData> {
        self.data.iter().find(|d| d.label == label)
    }
}

impl fmt::Display for MipsProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".data")?;
        for data in &self.data {
            writeln!(f, "{}", data)?;
        }
        writeln!(f)?;
        writeln!(f, ".text")?;
        writeln!(f, ".globl main")?;
        for procedure in &self.text {
            writeln!(f, "{}", procedure)?;
        }
        Ok(())
    }
}
