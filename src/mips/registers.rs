use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    T8,
    T9,
    A0,
    A1,
    A2,
    A3,
    V0,
    Fp,
    Sp,
    Ra,
    Zero,
}

/// The pool the emitter draws scratch registers from.
pub const TEMPORARIES: [Register; 10] = [
    Register::T0,
    Register::T1,
    Register::T2,
    Register::T3,
    Register::T4,
    Register::T5,
    Register::T6,
    Register::T7,
    Register::T8,
    Register::T9,
];

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::T0 => "$t0",
            Register::T1 => "$t1",
            Register::T2 => "$t2",
            Register::T3 => "$t3",
            Register::T4 => "$t4",
            Register::T5 => "$t5",
            Register::T6 => "$t6",
            Register::T7 => "$t7",
            Register::T8 => "$t8",
            Register::T9 => "$t9",
            Register::A0 => "$a0",
            Register::A1 => "$a1",
            Register::A2 => "$a2",
            Register::A3 => "$a3",
            Register::V0 => "$v0",
            Register::Fp => "$fp",
            Register::Sp => "$sp",
            Register::Ra => "$ra",
            Register::Zero => "$zero",
        };
        write!(f, "{}", name)
    }
}

/// Scratch-register allocator over `$t0..$t9`.
///
/// Lowering one CIL instruction brackets its acquisitions between `save` and
/// `restore`; snapshots nest, so a bracket opened inside another releases
/// only its own registers. Exhaustion inside a bracket is a compiler bug,
/// never a user-facing error.
#[derive(Debug, Default)]
pub struct RegisterPool {
    in_use: Vec<Register>,
    snapshots: Vec<usize>,
}

impl RegisterPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// First free register in `$t0..$t9` order; deterministic so two runs
    /// over the same program emit identical code.
    pub fn acquire(&mut self) -> Option<Register> {
        let reg = TEMPORARIES
            .iter()
            .copied()
            .find(|r| !self.in_use.contains(r))?;
        self.in_use.push(reg);
        Some(reg)
    }

    pub fn save(&mut self) {
        self.snapshots.push(self.in_use.len());
    }

    /// Releases every register acquired since the matching `save`.
    pub fn restore(&mut self) {
        let mark = self.snapshots.pop().unwrap_or(0);
        self.in_use.truncate(mark);
    }
}
