//! Lowering of a regexp tree to a linear breadth-first program.
//!
//! The emitted program has a fixed outer shape:
//!
//! ```text
//! [lazy any-prefix]            unless sticky or anchored at start
//! SET_REGISTER_TO_CP r0
//! <pattern>
//! SET_REGISTER_TO_CP r1
//! ACCEPT
//! [lookaround automata]        completion order, innermost first
//! [capture-filter program]     when enabled in the config
//! ```
//!
//! Registers `r0`/`r1` bound the whole match (capture group 0).

mod filter;
mod generator;
mod lookaround;
mod quantifier;

#[cfg(test)]
mod lookaround_tests;

use skein_ast::{Flags, Node};
use skein_bytecode::Program;

use crate::feasibility::can_be_handled;
use crate::{CompileError, Config};
use generator::Generator;

/// Compile `tree` into a [`Program`] for the breadth-first VM.
///
/// `capture_count` is the number of explicit capture groups in the
/// pattern; the program's register file covers those plus the implicit
/// group 0. The output is deterministic in all inputs.
pub fn compile(
    tree: &Node,
    flags: Flags,
    capture_count: u16,
    config: &Config,
) -> Result<Program, CompileError> {
    if !can_be_handled(tree, flags, config) {
        return Err(CompileError::Unsupported);
    }

    let mut generator = Generator::new(flags, config);

    // Unanchored patterns may start anywhere, which a breadth-first VM
    // expresses as a lazy `.*` in front of the pattern. Sticky matching
    // pins the start instead.
    if !flags.sticky && !tree.is_anchored_at_start() {
        generator.compile_any_prefix();
    }

    generator.asm.set_register_to_cp(0);
    generator.compile_node(tree);
    generator.asm.set_register_to_cp(1);
    generator.asm.accept();

    generator.drain_lookarounds();

    if config.enable_capture_filter_pass {
        generator.compile_filter(tree);
    }

    Ok(generator.into_program(capture_count))
}
