// CIL - the flat three-address intermediate form between the checked AST
// and the MIPS back end

pub mod builder;
pub mod debug;
pub mod instr;
pub mod program;
pub mod verify;

pub use builder::{CilBuilder, CilError};
pub use instr::{CilInstruction, RuntimeErrorKind, Value};
pub use program::{CilData, CilFunction, CilProgram, CilType};
