use std::fmt::Write as _;

use crate::cil::program::{CilFunction, CilProgram};

/// Readable listing of a CIL program, for logs and test failures.
pub fn dump_program(program: &CilProgram) -> String {
    let mut s = String::new();
    if !program.types.is_empty() {
        let _ = writeln!(&mut s, "Types ({}):", program.types.len());
        for ty in &program.types {
            let _ = writeln!(
                &mut s,
                "  {}: attrs [{}], methods [{}]",
                ty.name,
                ty.attributes.join(", "),
                ty.methods
                    .iter()
                    .map(|(m, l)| format!("{}->{}", m, l))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    if !program.data.is_empty() {
        let _ = writeln!(&mut s, "Data ({}):", program.data.len());
        for data in &program.data {
            let _ = writeln!(&mut s, "  {}: {:?}", data.name, data.value);
        }
    }
    for function in &program.code {
        let _ = writeln!(&mut s);
        s.push_str(&dump_function(function));
    }
    s
}

pub fn dump_function(function: &CilFunction) -> String {
    let mut s = String::new();
    let _ = writeln!(
        &mut s,
        "fn {}({})",
        function.name,
        function.params.join(", ")
    );
    if !function.locals.is_empty() {
        let _ = writeln!(&mut s, "  locals: {}", function.locals.join(", "));
    }
    for instruction in &function.instructions {
        let _ = writeln!(&mut s, "    {:?}", instruction);
    }
    s
}
