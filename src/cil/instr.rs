/// Operand of a `Load`: an integer immediate or the address of a data or
/// descriptor label.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Label(String),
}

/// The fixed set of runtime failures a compiled program can raise. Each maps
/// to one `.asciiz` message and an exit stub in the emitted MIPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeErrorKind {
    AbortSignal,
    CaseMissmatch,
    CaseOnVoid,
    DispatchOnVoid,
    DivisionByZero,
    SubstrOutOfRange,
    HeapOverflow,
}

impl RuntimeErrorKind {
    pub const ALL: [RuntimeErrorKind; 7] = [
        RuntimeErrorKind::AbortSignal,
        RuntimeErrorKind::CaseMissmatch,
        RuntimeErrorKind::CaseOnVoid,
        RuntimeErrorKind::DispatchOnVoid,
        RuntimeErrorKind::DivisionByZero,
        RuntimeErrorKind::SubstrOutOfRange,
        RuntimeErrorKind::HeapOverflow,
    ];

    /// Data label of the message string.
    pub fn label(self) -> &'static str {
        match self {
            RuntimeErrorKind::AbortSignal => "abort_signal",
            RuntimeErrorKind::CaseMissmatch => "case_missmatch",
            RuntimeErrorKind::CaseOnVoid => "case_on_void",
            RuntimeErrorKind::DispatchOnVoid => "dispatch_on_void",
            RuntimeErrorKind::DivisionByZero => "division_by_zero",
            RuntimeErrorKind::SubstrOutOfRange => "substr_out_of_range",
            RuntimeErrorKind::HeapOverflow => "heap_overflow",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RuntimeErrorKind::AbortSignal => "Program execution aborted",
            RuntimeErrorKind::CaseMissmatch => {
                "Execution of a case statement without a matching branch"
            }
            RuntimeErrorKind::CaseOnVoid => "Case on void",
            RuntimeErrorKind::DispatchOnVoid => "Dispatch on void",
            RuntimeErrorKind::DivisionByZero => "Division by zero",
            RuntimeErrorKind::SubstrOutOfRange => "Substring out of range",
            RuntimeErrorKind::HeapOverflow => "Heap overflow",
        }
    }

    /// Label of the emitted exit stub procedure.
    pub fn stub_label(self) -> String {
        format!("__{}", self.label())
    }
}

/// Three-address instructions. Operands name locals or parameters of the
/// enclosing function; `ty` fields carry the static class the emitter needs
/// to resolve attribute offsets and dispatch slots.
#[derive(Debug, Clone, PartialEq)]
pub enum CilInstruction {
    Load { dest: String, value: Value },
    Assign { dest: String, src: String },
    Plus { dest: String, left: String, right: String },
    Minus { dest: String, left: String, right: String },
    Star { dest: String, left: String, right: String },
    Div { dest: String, left: String, right: String },
    Less { dest: String, left: String, right: String },
    LessEq { dest: String, left: String, right: String },
    Allocate { dest: String, ty: String },
    GetAttrib { dest: String, instance: String, ty: String, attr: String },
    SetAttrib { instance: String, ty: String, attr: String, value: String },
    StaticCall { dest: String, function: String },
    DynamicCall { dest: String, instance: String, ty: String, method: String },
    TypeOf { dest: String, instance: String },
    TypeName { dest: String, instance: String },
    Arg { name: String },
    Return { value: Option<String> },
    Goto { label: String },
    /// Branch when `cond` is nonzero.
    GotoIf { cond: String, label: String },
    Label { name: String },
    RuntimeError { kind: RuntimeErrorKind },
    Copy { dest: String, src: String },
    Comment { text: String },
}
