// MIPS back end - abstract instruction set, register pool and the emitter
// that lowers CIL onto the activation-record discipline

pub mod data;
pub mod emitter;
pub mod instr;
pub mod program;
pub mod registers;

pub use data::{DataDirective, MipsData};
pub use emitter::{EmitError, MipsEmitter};
pub use instr::MipsInstruction;
pub use program::{MipsProcedure, MipsProgram};
pub use registers::{Register, RegisterPool};
