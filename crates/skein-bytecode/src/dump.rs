//! Human-readable program dump for debugging and tests.

use std::fmt::Write as _;

use crate::program::Program;

/// Render a program one instruction per line, prefixed with its index.
///
/// The output is stable for a given program and is asserted on in tests,
/// so changes here are format changes, not cosmetic ones.
pub fn dump(program: &Program) -> String {
    // Pad indices to the width of the largest one.
    let last_index = program.code.len().saturating_sub(1).max(1);
    let width = last_index.ilog10() as usize + 1;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "; registers: {}, quantifiers: {}, lookarounds: {}",
        program.register_count, program.quantifier_count, program.lookaround_count
    );
    for (index, instr) in program.code.iter().enumerate() {
        let _ = writeln!(out, "{index:>width$}  {instr}");
    }
    out
}
