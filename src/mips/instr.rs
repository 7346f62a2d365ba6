use std::fmt;

use crate::mips::registers::Register;

/// Abstract MIPS instructions, rendered in SPIM/MARS syntax by `Display`.
/// Three-operand `mul`, `div` and `sle` are assembler pseudo-instructions.
#[derive(Debug, Clone, PartialEq)]
pub enum MipsInstruction {
    Lw { rt: Register, offset: i32, rs: Register },
    Sw { rt: Register, offset: i32, rs: Register },
    Lb { rt: Register, offset: i32, rs: Register },
    Sb { rt: Register, offset: i32, rs: Register },
    Li { rt: Register, imm: i32 },
    La { rt: Register, label: String },
    Move { rd: Register, rs: Register },
    Add { rd: Register, rs: Register, rt: Register },
    Addi { rt: Register, rs: Register, imm: i32 },
    Sub { rd: Register, rs: Register, rt: Register },
    Mul { rd: Register, rs: Register, rt: Register },
    Div { rd: Register, rs: Register, rt: Register },
    Slt { rd: Register, rs: Register, rt: Register },
    Sle { rd: Register, rs: Register, rt: Register },
    Beq { rs: Register, rt: Register, label: String },
    Bne { rs: Register, rt: Register, label: String },
    J { label: String },
    Jal { label: String },
    Jalr { rs: Register },
    Jr { rs: Register },
    Syscall,
    Label { name: String },
    Comment { text: String },
}

impl MipsInstruction {
    /// Label lines are rendered flush-left; everything else is indented.
    pub fn is_label(&self) -> bool {
        matches!(self, MipsInstruction::Label { .. })
    }
}

impl fmt::Display for MipsInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MipsInstruction::Lw { rt, offset, rs } => write!(f, "lw {}, {}({})", rt, offset, rs),
            MipsInstruction::Sw { rt, offset, rs } => write!(f, "sw {}, {}({})", rt, offset, rs),
            MipsInstruction::Lb { rt, offset, rs } => write!(f, "lb {}, {}({})", rt, offset, rs),
            MipsInstruction::Sb { rt, offset, rs } => write!(f, "sb {}, {}({})", rt, offset, rs),
            MipsInstruction::Li { rt, imm } => write!(f, "li {}, {}", rt, imm),
            MipsInstruction::La { rt, label } => write!(f, "la {}, {}", rt, label),
            MipsInstruction::Move { rd, rs } => write!(f, "move {}, {}", rd, rs),
            MipsInstruction::Add { rd, rs, rt } => write!(f, "add {}, {}, {}", rd, rs, rt),
            MipsInstruction::Addi { rt, rs, imm } => write!(f, "addi {}, {}, {}", rt, rs, imm),
            MipsInstruction::Sub { rd, rs, rt } => write!(f, "sub {}, {}, {}", rd, rs, rt),
            MipsInstruction::Mul { rd, rs, rt } => write!(f, "mul {}, {}, {}", rd, rs, rt),
            MipsInstruction::Div { rd, rs, rt } => write!(f, "div {}, {}, {}", rd, rs, rt),
            MipsInstruction::Slt { rd, rs, rt } => write!(f, "slt {}, {}, {}", rd, rs, rt),
            MipsInstruction::Sle { rd, rs, rt } => write!(f, "sle {}, {}, {}", rd, rs, rt),
            MipsInstruction::Beq { rs, rt, label } => write!(f, "beq {}, {}, {}", rs, rt, label),
            MipsInstruction::Bne { rs, rt, label } => write!(f, "bne {}, {}, {}", rs, rt, label),
            MipsInstruction::J { label } => write!(f, "j {}", label),
            MipsInstruction::Jal { label } => write!(f, "jal {}", label),
            MipsInstruction::Jalr { rs } => write!(f, "jalr {}", rs),
            MipsInstruction::Jr { rs } => write!(f, "jr {}", rs),
            MipsInstruction::Syscall => write!(f, "syscall"),
            MipsInstruction::Label { name } => write!(f, "{}:", name),
            MipsInstruction::Comment { text } => write!(f, "# {}", text),
        }
    }
}
