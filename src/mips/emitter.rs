use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::cil::instr::{CilInstruction, RuntimeErrorKind, Value};
use crate::cil::program::{CilProgram, CilType};
use crate::mips::data::MipsData;
use crate::mips::instr::MipsInstruction as I;
use crate::mips::program::{MipsProcedure, MipsProgram};
use crate::mips::registers::{Register, RegisterPool};

// descriptor layout
const TYPENAME_OFFSET: i32 = 0;
const INSTANCE_SIZE_OFFSET: i32 = 4;
const METHOD_OFFSET: i32 = 8;

// frame layout, addressed via $fp after the prologue
const OLD_FP_OFFSET: i32 = 0;
const RA_OFFSET: i32 = 4;
const ARGS_BASE_OFFSET: i32 = 8;

const SYSCALL_PRINT_INT: i32 = 1;
const SYSCALL_PRINT_STR: i32 = 4;
const SYSCALL_READ_INT: i32 = 5;
const SYSCALL_READ_STR: i32 = 8;
const SYSCALL_SBRK: i32 = 9;
const SYSCALL_EXIT: i32 = 10;

const READ_BUFFER_SIZE: i32 = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("temporary register pool exhausted in '{0}'")]
    RegisterPoolExhausted(String),
    #[error("name '{0}' has no frame slot in '{1}'")]
    UnknownName(String, String),
    #[error("unknown type '{0}' during emission")]
    UnknownType(String),
    #[error("type '{0}' has no method '{1}'")]
    UnknownMethod(String, String),
    #[error("type '{0}' has no attribute '{1}'")]
    UnknownAttribute(String, String),
}

/// Lowers a CIL program to MIPS.
///
/// Frame discipline: the prologue pushes `$ra`, then the old `$fp`, then
/// sets `$fp := $sp` and reserves the locals region. Read through `$fp`,
/// the old `$fp` sits at offset 0 and `$ra` at offset 4; local *i* lives at
/// `-4*(i+1)` and argument *i* of *n* at `8 + 4*(n-1-i)` (the caller pushes
/// arguments in source order). The epilogue pops locals, the saved pair and
/// the incoming arguments in a single `addi`, so `$sp` is balanced across
/// every call.
pub struct MipsEmitter<'a> {
    cil: &'a CilProgram,
    data: Vec<MipsData>,
    text: Vec<MipsProcedure>,
    current: MipsProcedure,
    function_name: String,
    locals: Vec<String>,
    params: Vec<String>,
    attr_offsets: HashMap<(String, String), i32>,
    pool: RegisterPool,
}

impl<'a> MipsEmitter<'a> {
    pub fn emit(cil: &'a CilProgram) -> Result<MipsProgram, EmitError> {
        let mut emitter = Self {
            cil,
            data: Vec::new(),
            text: Vec::new(),
            current: MipsProcedure::default(),
            function_name: String::new(),
            locals: Vec::new(),
            params: Vec::new(),
            attr_offsets: HashMap::new(),
            pool: RegisterPool::new(),
        };

        for ty in &cil.types {
            emitter.emit_type(ty);
        }
        emitter.emit_error_messages();
        for datum in &cil.data {
            emitter.data.push(MipsData::asciiz(datum.name.clone(), &datum.value));
        }

        for function in &cil.code {
            emitter.emit_function(function)?;
        }
        emitter.emit_error_stubs();
        emitter.emit_builtins();

        debug!(
            "mips emission done: {} data entries, {} procedures",
            emitter.data.len(),
            emitter.text.len()
        );
        Ok(MipsProgram {
            data: emitter.data,
            text: emitter.text,
        })
    }

    /// Per-class descriptor: name-string pointer, instance size in bytes,
    /// then the dispatch table labels in slot order. The companion
    /// `{T}_cname` entry holds the printable class name.
    fn emit_type(&mut self, ty: &CilType) {
        let size = 4 * (ty.attributes.len() as i32 + 1);
        let mut values = vec![format!("{}_cname", ty.name), size.to_string()];
        values.extend(ty.methods.iter().map(|(_, label)| label.clone()));
        self.data.push(MipsData::word(ty.name.clone(), values));
        self.data
            .push(MipsData::asciiz(format!("{}_cname", ty.name), &ty.name));

        for (i, attr) in ty.attributes.iter().enumerate() {
            self.attr_offsets
                .insert((ty.name.clone(), attr.clone()), 4 * (i as i32 + 1));
        }
    }

    fn emit_error_messages(&mut self) {
        for kind in RuntimeErrorKind::ALL {
            self.data
                .push(MipsData::asciiz(kind.label(), kind.message()));
        }
    }

    /// One exit stub per runtime error: print the message, exit.
    fn emit_error_stubs(&mut self) {
        for kind in RuntimeErrorKind::ALL {
            let mut stub = MipsProcedure::new(kind.stub_label());
            stub.instructions.extend([
                I::La {
                    rt: Register::A0,
                    label: kind.label().to_string(),
                },
                I::Li {
                    rt: Register::V0,
                    imm: SYSCALL_PRINT_STR,
                },
                I::Syscall,
                I::Li {
                    rt: Register::V0,
                    imm: SYSCALL_EXIT,
                },
                I::Syscall,
            ]);
            self.text.push(stub);
        }
    }

    fn emit_function(&mut self, function: &crate::cil::program::CilFunction) -> Result<(), EmitError> {
        self.current = MipsProcedure::new(function.name.clone());
        self.function_name = function.name.clone();
        self.locals = function.locals.clone();
        self.params = function.params.clone();

        self.push(I::Comment {
            text: "prologue".to_string(),
        });
        self.push_register(Register::Ra);
        self.push_register(Register::Fp);
        self.push(I::Move {
            rd: Register::Fp,
            rs: Register::Sp,
        });
        if !self.locals.is_empty() {
            self.push(I::Addi {
                rt: Register::Sp,
                rs: Register::Sp,
                imm: -4 * self.locals.len() as i32,
            });
        }

        for instruction in &function.instructions {
            self.emit_instruction(instruction)?;
        }

        let finished = std::mem::take(&mut self.current);
        self.text.push(finished);
        Ok(())
    }

    fn emit_instruction(&mut self, instruction: &CilInstruction) -> Result<(), EmitError> {
        match instruction {
            CilInstruction::Load { dest, value } => {
                self.pool.save();
                let reg = self.acquire()?;
                match value {
                    Value::Int(imm) => self.push(I::Li { rt: reg, imm: *imm }),
                    Value::Label(label) => self.push(I::La {
                        rt: reg,
                        label: label.clone(),
                    }),
                }
                self.store_name(reg, dest)?;
                self.pool.restore();
            }
            CilInstruction::Assign { dest, src } => {
                self.pool.save();
                let reg = self.acquire()?;
                self.load_name(reg, src)?;
                self.store_name(reg, dest)?;
                self.pool.restore();
            }
            CilInstruction::Plus { dest, left, right } => {
                self.emit_binary(dest, left, right, |rd, rs, rt| I::Add { rd, rs, rt })?;
            }
            CilInstruction::Minus { dest, left, right } => {
                self.emit_binary(dest, left, right, |rd, rs, rt| I::Sub { rd, rs, rt })?;
            }
            CilInstruction::Star { dest, left, right } => {
                self.emit_binary(dest, left, right, |rd, rs, rt| I::Mul { rd, rs, rt })?;
            }
            CilInstruction::Div { dest, left, right } => {
                self.pool.save();
                let lhs = self.acquire()?;
                let rhs = self.acquire()?;
                let out = self.acquire()?;
                self.load_name(lhs, left)?;
                self.load_name(rhs, right)?;
                // a zero divisor aborts before the div executes
                self.push(I::Beq {
                    rs: rhs,
                    rt: Register::Zero,
                    label: RuntimeErrorKind::DivisionByZero.stub_label(),
                });
                self.push(I::Div {
                    rd: out,
                    rs: lhs,
                    rt: rhs,
                });
                self.store_name(out, dest)?;
                self.pool.restore();
            }
            CilInstruction::Less { dest, left, right } => {
                self.emit_binary(dest, left, right, |rd, rs, rt| I::Slt { rd, rs, rt })?;
            }
            CilInstruction::LessEq { dest, left, right } => {
                self.emit_binary(dest, left, right, |rd, rs, rt| I::Sle { rd, rs, rt })?;
            }
            CilInstruction::Allocate { dest, ty } => {
                self.pool.save();
                let attrs = self
                    .cil
                    .type_of(ty)
                    .ok_or_else(|| EmitError::UnknownType(ty.clone()))?
                    .attributes
                    .len() as i32;
                self.push(I::Li {
                    rt: Register::V0,
                    imm: SYSCALL_SBRK,
                });
                self.push(I::Li {
                    rt: Register::A0,
                    imm: 4 * (attrs + 1),
                });
                self.push(I::Syscall);
                self.store_name(Register::V0, dest)?;
                let reg = self.acquire()?;
                self.push(I::La {
                    rt: reg,
                    label: ty.clone(),
                });
                self.push(I::Sw {
                    rt: reg,
                    offset: 0,
                    rs: Register::V0,
                });
                self.pool.restore();
            }
            CilInstruction::GetAttrib {
                dest,
                instance,
                ty,
                attr,
            } => {
                self.pool.save();
                let base = self.acquire()?;
                let value = self.acquire()?;
                self.load_name(base, instance)?;
                let offset = self.attr_offset(ty, attr)?;
                self.push(I::Lw {
                    rt: value,
                    offset,
                    rs: base,
                });
                self.store_name(value, dest)?;
                self.pool.restore();
            }
            CilInstruction::SetAttrib {
                instance,
                ty,
                attr,
                value,
            } => {
                self.pool.save();
                let base = self.acquire()?;
                let val = self.acquire()?;
                self.load_name(base, instance)?;
                self.load_name(val, value)?;
                let offset = self.attr_offset(ty, attr)?;
                self.push(I::Sw {
                    rt: val,
                    offset,
                    rs: base,
                });
                self.pool.restore();
            }
            CilInstruction::StaticCall { dest, function } => {
                self.push(I::Jal {
                    label: function.clone(),
                });
                self.store_name(Register::A1, dest)?;
            }
            CilInstruction::DynamicCall {
                dest,
                instance,
                ty,
                method,
            } => {
                self.pool.save();
                let slot = self
                    .cil
                    .type_of(ty)
                    .ok_or_else(|| EmitError::UnknownType(ty.clone()))?
                    .method_slot(method)
                    .ok_or_else(|| EmitError::UnknownMethod(ty.clone(), method.clone()))?;
                let receiver = self.acquire()?;
                self.load_name(receiver, instance)?;
                self.push(I::Beq {
                    rs: receiver,
                    rt: Register::Zero,
                    label: RuntimeErrorKind::DispatchOnVoid.stub_label(),
                });
                let descriptor = self.acquire()?;
                self.push(I::Lw {
                    rt: descriptor,
                    offset: 0,
                    rs: receiver,
                });
                let target = self.acquire()?;
                self.push(I::Lw {
                    rt: target,
                    offset: METHOD_OFFSET + 4 * slot as i32,
                    rs: descriptor,
                });
                self.push(I::Jalr { rs: target });
                self.store_name(Register::A1, dest)?;
                self.pool.restore();
            }
            CilInstruction::TypeOf { dest, instance } => {
                self.pool.save();
                let base = self.acquire()?;
                let descriptor = self.acquire()?;
                self.load_name(base, instance)?;
                self.push(I::Lw {
                    rt: descriptor,
                    offset: 0,
                    rs: base,
                });
                self.store_name(descriptor, dest)?;
                self.pool.restore();
            }
            CilInstruction::TypeName { dest, instance } => {
                // `instance` holds a descriptor pointer
                self.pool.save();
                let descriptor = self.acquire()?;
                let name = self.acquire()?;
                self.load_name(descriptor, instance)?;
                self.push(I::Lw {
                    rt: name,
                    offset: TYPENAME_OFFSET,
                    rs: descriptor,
                });
                self.store_name(name, dest)?;
                self.pool.restore();
            }
            CilInstruction::Arg { name } => {
                self.pool.save();
                let reg = self.acquire()?;
                self.load_name(reg, name)?;
                self.push_register(reg);
                self.pool.restore();
            }
            CilInstruction::Return { value } => {
                match value {
                    Some(src) => {
                        let offset = self.frame_offset(src)?;
                        self.push(I::Lw {
                            rt: Register::A1,
                            offset,
                            rs: Register::Fp,
                        });
                    }
                    None => self.push(I::Li {
                        rt: Register::A1,
                        imm: 0,
                    }),
                }
                self.emit_epilogue();
            }
            CilInstruction::Goto { label } => {
                self.push(I::J {
                    label: label.clone(),
                });
            }
            CilInstruction::GotoIf { cond, label } => {
                self.pool.save();
                let reg = self.acquire()?;
                self.load_name(reg, cond)?;
                self.push(I::Bne {
                    rs: reg,
                    rt: Register::Zero,
                    label: label.clone(),
                });
                self.pool.restore();
            }
            CilInstruction::Label { name } => {
                self.push(I::Label { name: name.clone() });
            }
            CilInstruction::RuntimeError { kind } => {
                self.push(I::J {
                    label: kind.stub_label(),
                });
            }
            CilInstruction::Copy { dest, src } => {
                self.load_name(Register::A0, src)?;
                self.push(I::Jal {
                    label: "__copy_words".to_string(),
                });
                self.store_name(Register::A1, dest)?;
            }
            CilInstruction::Comment { text } => {
                self.push(I::Comment { text: text.clone() });
            }
        }
        Ok(())
    }

    fn emit_binary(
        &mut self,
        dest: &str,
        left: &str,
        right: &str,
        build: impl Fn(Register, Register, Register) -> I,
    ) -> Result<(), EmitError> {
        self.pool.save();
        let lhs = self.acquire()?;
        let rhs = self.acquire()?;
        let out = self.acquire()?;
        self.load_name(lhs, left)?;
        self.load_name(rhs, right)?;
        self.push(build(out, lhs, rhs));
        self.store_name(out, dest)?;
        self.pool.restore();
        Ok(())
    }

    /// The entry procedure exits the program instead of returning; every
    /// other function restores the saved pair, pops its whole activation
    /// and jumps back.
    fn emit_epilogue(&mut self) {
        if self.function_name == crate::cil::builder::ENTRY_FUNCTION {
            self.push(I::Li {
                rt: Register::V0,
                imm: SYSCALL_EXIT,
            });
            self.push(I::Syscall);
            return;
        }
        self.push(I::Comment {
            text: "epilogue".to_string(),
        });
        self.push(I::Lw {
            rt: Register::Ra,
            offset: RA_OFFSET,
            rs: Register::Fp,
        });
        self.push(I::Lw {
            rt: Register::Fp,
            offset: OLD_FP_OFFSET,
            rs: Register::Fp,
        });
        let activation = 4 * (self.locals.len() + self.params.len() + 2) as i32;
        self.push(I::Addi {
            rt: Register::Sp,
            rs: Register::Sp,
            imm: activation,
        });
        self.push(I::Jr { rs: Register::Ra });
    }

    // --- frame helpers ---

    fn frame_offset(&self, name: &str) -> Result<i32, EmitError> {
        if let Some(i) = self.locals.iter().position(|l| l == name) {
            return Ok(-4 * (i as i32 + 1));
        }
        if let Some(i) = self.params.iter().position(|p| p == name) {
            let n = self.params.len() as i32;
            return Ok(ARGS_BASE_OFFSET + 4 * (n - 1 - i as i32));
        }
        Err(EmitError::UnknownName(
            name.to_string(),
            self.function_name.clone(),
        ))
    }

    fn load_name(&mut self, reg: Register, name: &str) -> Result<(), EmitError> {
        let offset = self.frame_offset(name)?;
        self.push(I::Lw {
            rt: reg,
            offset,
            rs: Register::Fp,
        });
        Ok(())
    }

    fn store_name(&mut self, reg: Register, name: &str) -> Result<(), EmitError> {
        let offset = self.frame_offset(name)?;
        self.push(I::Sw {
            rt: reg,
            offset,
            rs: Register::Fp,
        });
        Ok(())
    }

    fn attr_offset(&self, ty: &str, attr: &str) -> Result<i32, EmitError> {
        self.attr_offsets
            .get(&(ty.to_string(), attr.to_string()))
            .copied()
            .ok_or_else(|| EmitError::UnknownAttribute(ty.to_string(), attr.to_string()))
    }

    fn acquire(&mut self) -> Result<Register, EmitError> {
        self.pool
            .acquire()
            .ok_or_else(|| EmitError::RegisterPoolExhausted(self.function_name.clone()))
    }

    fn push(&mut self, instruction: I) {
        self.current.instructions.push(instruction);
    }

    fn push_register(&mut self, reg: Register) {
        self.push(I::Addi {
            rt: Register::Sp,
            rs: Register::Sp,
            imm: -4,
        });
        self.push(I::Sw {
            rt: reg,
            offset: 0,
            rs: Register::Sp,
        });
    }

    // --- runtime builtins -------------------------------------------------
    //
    // Hand-written procedures for the built-in methods. They follow the
    // same frame discipline as compiled functions so callers cannot tell
    // them apart.

    fn emit_builtins(&mut self) {
        self.emit_object_abort();
        self.emit_object_type_name();
        self.emit_object_copy();
        self.emit_copy_words();
        self.emit_io_out_string();
        self.emit_io_out_int();
        self.emit_io_in_string();
        self.emit_io_in_int();
        self.emit_strlen();
        self.emit_string_length();
        self.emit_string_concat();
        self.emit_string_substr();
    }

    fn begin_native(&mut self, label: &str, nparams: usize) {
        self.current = MipsProcedure::new(label);
        self.function_name = label.to_string();
        self.locals = Vec::new();
        self.params = vec![String::new(); nparams];
        self.push_register(Register::Ra);
        self.push_register(Register::Fp);
        self.push(I::Move {
            rd: Register::Fp,
            rs: Register::Sp,
        });
    }

    fn end_native(&mut self) {
        self.emit_epilogue();
        let finished = std::mem::take(&mut self.current);
        self.text.push(finished);
    }

    /// Offset of argument `i` of the current native procedure.
    fn native_arg(&self, i: usize) -> i32 {
        let n = self.params.len() as i32;
        ARGS_BASE_OFFSET + 4 * (n - 1 - i as i32)
    }

    fn emit_object_abort(&mut self) {
        self.begin_native("Object_abort", 1);
        self.push(I::La {
            rt: Register::A0,
            label: RuntimeErrorKind::AbortSignal.label().to_string(),
        });
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_PRINT_STR,
        });
        self.push(I::Syscall);
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_EXIT,
        });
        self.push(I::Syscall);
        let finished = std::mem::take(&mut self.current);
        self.text.push(finished);
    }

    fn emit_object_type_name(&mut self) {
        self.begin_native("Object_type_name", 1);
        let self_offset = self.native_arg(0);
        self.push(I::Lw {
            rt: Register::T0,
            offset: self_offset,
            rs: Register::Fp,
        });
        self.push(I::Lw {
            rt: Register::T1,
            offset: 0,
            rs: Register::T0,
        });
        self.push(I::Lw {
            rt: Register::A1,
            offset: TYPENAME_OFFSET,
            rs: Register::T1,
        });
        self.end_native();
    }

    fn emit_object_copy(&mut self) {
        self.begin_native("Object_copy", 1);
        let self_offset = self.native_arg(0);
        self.push(I::Lw {
            rt: Register::A0,
            offset: self_offset,
            rs: Register::Fp,
        });
        self.push(I::Jal {
            label: "__copy_words".to_string(),
        });
        self.end_native();
    }

    /// Raw helper: `$a0` = instance, returns the sbrk'd copy in `$a1`. The
    /// word count comes from the descriptor's size field.
    fn emit_copy_words(&mut self) {
        let mut p = MipsProcedure::new("__copy_words");
        p.instructions.extend([
            I::Beq {
                rs: Register::A0,
                rt: Register::Zero,
                label: "__copy_words_null".to_string(),
            },
            I::Lw {
                rt: Register::T0,
                offset: 0,
                rs: Register::A0,
            },
            I::Lw {
                rt: Register::T1,
                offset: INSTANCE_SIZE_OFFSET,
                rs: Register::T0,
            },
            I::Move {
                rd: Register::T2,
                rs: Register::A0,
            },
            I::Move {
                rd: Register::A0,
                rs: Register::T1,
            },
            I::Li {
                rt: Register::V0,
                imm: SYSCALL_SBRK,
            },
            I::Syscall,
            I::Move {
                rd: Register::A1,
                rs: Register::V0,
            },
            I::Li {
                rt: Register::T3,
                imm: 0,
            },
            I::Label {
                name: "__copy_words_loop".to_string(),
            },
            I::Slt {
                rd: Register::T4,
                rs: Register::T3,
                rt: Register::T1,
            },
            I::Beq {
                rs: Register::T4,
                rt: Register::Zero,
                label: "__copy_words_done".to_string(),
            },
            I::Add {
                rd: Register::T5,
                rs: Register::T2,
                rt: Register::T3,
            },
            I::Lw {
                rt: Register::T6,
                offset: 0,
                rs: Register::T5,
            },
            I::Add {
                rd: Register::T7,
                rs: Register::A1,
                rt: Register::T3,
            },
            I::Sw {
                rt: Register::T6,
                offset: 0,
                rs: Register::T7,
            },
            I::Addi {
                rt: Register::T3,
                rs: Register::T3,
                imm: 4,
            },
            I::J {
                label: "__copy_words_loop".to_string(),
            },
            I::Label {
                name: "__copy_words_null".to_string(),
            },
            I::Li {
                rt: Register::A1,
                imm: 0,
            },
            I::Label {
                name: "__copy_words_done".to_string(),
            },
            I::Jr { rs: Register::Ra },
        ]);
        self.text.push(p);
    }

    fn emit_io_out_string(&mut self) {
        self.begin_native("IO_out_string", 2);
        let x = self.native_arg(1);
        let receiver = self.native_arg(0);
        self.push(I::Lw {
            rt: Register::A0,
            offset: x,
            rs: Register::Fp,
        });
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_PRINT_STR,
        });
        self.push(I::Syscall);
        self.push(I::Lw {
            rt: Register::A1,
            offset: receiver,
            rs: Register::Fp,
        });
        self.end_native();
    }

    fn emit_io_out_int(&mut self) {
        self.begin_native("IO_out_int", 2);
        let x = self.native_arg(1);
        let receiver = self.native_arg(0);
        self.push(I::Lw {
            rt: Register::A0,
            offset: x,
            rs: Register::Fp,
        });
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_PRINT_INT,
        });
        self.push(I::Syscall);
        self.push(I::Lw {
            rt: Register::A1,
            offset: receiver,
            rs: Register::Fp,
        });
        self.end_native();
    }

    /// Reads into a fresh sbrk'd buffer and chops the trailing newline the
    /// read-string syscall leaves behind.
    fn emit_io_in_string(&mut self) {
        self.begin_native("IO_in_string", 1);
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_SBRK,
        });
        self.push(I::Li {
            rt: Register::A0,
            imm: READ_BUFFER_SIZE,
        });
        self.push(I::Syscall);
        self.push(I::Move {
            rd: Register::T0,
            rs: Register::V0,
        });
        self.push(I::Move {
            rd: Register::A0,
            rs: Register::T0,
        });
        self.push(I::Li {
            rt: Register::A1,
            imm: READ_BUFFER_SIZE,
        });
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_READ_STR,
        });
        self.push(I::Syscall);
        self.push(I::Move {
            rd: Register::T1,
            rs: Register::T0,
        });
        self.push(I::Label {
            name: "__in_string_scan".to_string(),
        });
        self.push(I::Lb {
            rt: Register::T2,
            offset: 0,
            rs: Register::T1,
        });
        self.push(I::Beq {
            rs: Register::T2,
            rt: Register::Zero,
            label: "__in_string_done".to_string(),
        });
        self.push(I::Li {
            rt: Register::T3,
            imm: 10,
        });
        self.push(I::Beq {
            rs: Register::T2,
            rt: Register::T3,
            label: "__in_string_chop".to_string(),
        });
        self.push(I::Addi {
            rt: Register::T1,
            rs: Register::T1,
            imm: 1,
        });
        self.push(I::J {
            label: "__in_string_scan".to_string(),
        });
        self.push(I::Label {
            name: "__in_string_chop".to_string(),
        });
        self.push(I::Sb {
            rt: Register::Zero,
            offset: 0,
            rs: Register::T1,
        });
        self.push(I::Label {
            name: "__in_string_done".to_string(),
        });
        self.push(I::Move {
            rd: Register::A1,
            rs: Register::T0,
        });
        self.end_native();
    }

    fn emit_io_in_int(&mut self) {
        self.begin_native("IO_in_int", 1);
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_READ_INT,
        });
        self.push(I::Syscall);
        self.push(I::Move {
            rd: Register::A1,
            rs: Register::V0,
        });
        self.end_native();
    }

    /// Raw helper: `$a0` = string pointer, returns the byte length in
    /// `$a1`. Clobbers `$t0` and `$t1`.
    fn emit_strlen(&mut self) {
        let mut p = MipsProcedure::new("__strlen");
        p.instructions.extend([
            I::Move {
                rd: Register::T0,
                rs: Register::A0,
            },
            I::Li {
                rt: Register::A1,
                imm: 0,
            },
            I::Label {
                name: "__strlen_loop".to_string(),
            },
            I::Lb {
                rt: Register::T1,
                offset: 0,
                rs: Register::T0,
            },
            I::Beq {
                rs: Register::T1,
                rt: Register::Zero,
                label: "__strlen_done".to_string(),
            },
            I::Addi {
                rt: Register::A1,
                rs: Register::A1,
                imm: 1,
            },
            I::Addi {
                rt: Register::T0,
                rs: Register::T0,
                imm: 1,
            },
            I::J {
                label: "__strlen_loop".to_string(),
            },
            I::Label {
                name: "__strlen_done".to_string(),
            },
            I::Jr { rs: Register::Ra },
        ]);
        self.text.push(p);
    }

    fn emit_string_length(&mut self) {
        self.begin_native("String_length", 1);
        let receiver = self.native_arg(0);
        self.push(I::Lw {
            rt: Register::A0,
            offset: receiver,
            rs: Register::Fp,
        });
        self.push(I::Jal {
            label: "__strlen".to_string(),
        });
        self.end_native();
    }

    fn emit_string_concat(&mut self) {
        self.begin_native("String_concat", 2);
        let receiver = self.native_arg(0);
        let other = self.native_arg(1);
        // total length, then one buffer and two byte-copy loops
        self.push(I::Lw {
            rt: Register::A0,
            offset: receiver,
            rs: Register::Fp,
        });
        self.push(I::Jal {
            label: "__strlen".to_string(),
        });
        self.push(I::Move {
            rd: Register::T7,
            rs: Register::A1,
        });
        self.push(I::Lw {
            rt: Register::A0,
            offset: other,
            rs: Register::Fp,
        });
        self.push(I::Jal {
            label: "__strlen".to_string(),
        });
        self.push(I::Add {
            rd: Register::T8,
            rs: Register::T7,
            rt: Register::A1,
        });
        self.push(I::Addi {
            rt: Register::A0,
            rs: Register::T8,
            imm: 1,
        });
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_SBRK,
        });
        self.push(I::Syscall);
        self.push(I::Move {
            rd: Register::T5,
            rs: Register::V0,
        });
        self.push(I::Move {
            rd: Register::T6,
            rs: Register::V0,
        });
        self.push(I::Lw {
            rt: Register::T0,
            offset: receiver,
            rs: Register::Fp,
        });
        self.push(I::Label {
            name: "__concat_first".to_string(),
        });
        self.push(I::Lb {
            rt: Register::T1,
            offset: 0,
            rs: Register::T0,
        });
        self.push(I::Beq {
            rs: Register::T1,
            rt: Register::Zero,
            label: "__concat_second_init".to_string(),
        });
        self.push(I::Sb {
            rt: Register::T1,
            offset: 0,
            rs: Register::T6,
        });
        self.push(I::Addi {
            rt: Register::T0,
            rs: Register::T0,
            imm: 1,
        });
        self.push(I::Addi {
            rt: Register::T6,
            rs: Register::T6,
            imm: 1,
        });
        self.push(I::J {
            label: "__concat_first".to_string(),
        });
        self.push(I::Label {
            name: "__concat_second_init".to_string(),
        });
        self.push(I::Lw {
            rt: Register::T0,
            offset: other,
            rs: Register::Fp,
        });
        self.push(I::Label {
            name: "__concat_second".to_string(),
        });
        self.push(I::Lb {
            rt: Register::T1,
            offset: 0,
            rs: Register::T0,
        });
        self.push(I::Beq {
            rs: Register::T1,
            rt: Register::Zero,
            label: "__concat_done".to_string(),
        });
        self.push(I::Sb {
            rt: Register::T1,
            offset: 0,
            rs: Register::T6,
        });
        self.push(I::Addi {
            rt: Register::T0,
            rs: Register::T0,
            imm: 1,
        });
        self.push(I::Addi {
            rt: Register::T6,
            rs: Register::T6,
            imm: 1,
        });
        self.push(I::J {
            label: "__concat_second".to_string(),
        });
        self.push(I::Label {
            name: "__concat_done".to_string(),
        });
        self.push(I::Sb {
            rt: Register::Zero,
            offset: 0,
            rs: Register::T6,
        });
        self.push(I::Move {
            rd: Register::A1,
            rs: Register::T5,
        });
        self.end_native();
    }

    fn emit_string_substr(&mut self) {
        self.begin_native("String_substr", 3);
        let receiver = self.native_arg(0);
        let start = self.native_arg(1);
        let length = self.native_arg(2);
        self.push(I::Lw {
            rt: Register::A0,
            offset: receiver,
            rs: Register::Fp,
        });
        self.push(I::Jal {
            label: "__strlen".to_string(),
        });
        self.push(I::Move {
            rd: Register::T0,
            rs: Register::A1,
        });
        self.push(I::Lw {
            rt: Register::T1,
            offset: start,
            rs: Register::Fp,
        });
        self.push(I::Lw {
            rt: Register::T2,
            offset: length,
            rs: Register::Fp,
        });
        // i < 0, l < 0 or i + l > length(self) are range errors
        let stub = RuntimeErrorKind::SubstrOutOfRange.stub_label();
        self.push(I::Slt {
            rd: Register::T3,
            rs: Register::T1,
            rt: Register::Zero,
        });
        self.push(I::Bne {
            rs: Register::T3,
            rt: Register::Zero,
            label: stub.clone(),
        });
        self.push(I::Slt {
            rd: Register::T3,
            rs: Register::T2,
            rt: Register::Zero,
        });
        self.push(I::Bne {
            rs: Register::T3,
            rt: Register::Zero,
            label: stub.clone(),
        });
        self.push(I::Add {
            rd: Register::T4,
            rs: Register::T1,
            rt: Register::T2,
        });
        self.push(I::Slt {
            rd: Register::T3,
            rs: Register::T0,
            rt: Register::T4,
        });
        self.push(I::Bne {
            rs: Register::T3,
            rt: Register::Zero,
            label: stub,
        });
        self.push(I::Addi {
            rt: Register::A0,
            rs: Register::T2,
            imm: 1,
        });
        self.push(I::Li {
            rt: Register::V0,
            imm: SYSCALL_SBRK,
        });
        self.push(I::Syscall);
        self.push(I::Move {
            rd: Register::T5,
            rs: Register::V0,
        });
        self.push(I::Lw {
            rt: Register::T6,
            offset: receiver,
            rs: Register::Fp,
        });
        self.push(I::Add {
            rd: Register::T6,
            rs: Register::T6,
            rt: Register::T1,
        });
        self.push(I::Move {
            rd: Register::T7,
            rs: Register::T5,
        });
        self.push(I::Li {
            rt: Register::T8,
            imm: 0,
        });
        self.push(I::Label {
            name: "__substr_copy".to_string(),
        });
        self.push(I::Slt {
            rd: Register::T3,
            rs: Register::T8,
            rt: Register::T2,
        });
        self.push(I::Beq {
            rs: Register::T3,
            rt: Register::Zero,
            label: "__substr_done".to_string(),
        });
        self.push(I::Lb {
            rt: Register::T9,
            offset: 0,
            rs: Register::T6,
        });
        self.push(I::Sb {
            rt: Register::T9,
            offset: 0,
            rs: Register::T7,
        });
        self.push(I::Addi {
            rt: Register::T6,
            rs: Register::T6,
            imm: 1,
        });
        self.push(I::Addi {
            rt: Register::T7,
            rs: Register::T7,
            imm: 1,
        });
        self.push(I::Addi {
            rt: Register::T8,
            rs: Register::T8,
            imm: 1,
        });
        self.push(I::J {
            label: "__substr_copy".to_string(),
        });
        self.push(I::Label {
            name: "__substr_done".to_string(),
        });
        self.push(I::Sb {
            rt: Register::Zero,
            offset: 0,
            rs: Register::T7,
        });
        self.push(I::Move {
            rd: Register::A1,
            rs: Register::T5,
        });
        self.end_native();
    }
}
