// Tests for CIL lowering and MIPS emission

pub mod emitter;
pub mod pipeline;
