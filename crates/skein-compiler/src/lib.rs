//! Regexp tree to bytecode compiler for the skein breadth-first VM.
//!
//! The pipeline has two user-facing operations:
//! - [`can_be_handled`] - static feasibility analysis deciding whether a
//!   tree compiles under the VM's no-backtracking constraints
//! - [`compile`] - lowering of a feasible tree to a linear [`Program`]
//!
//! Internally:
//! - `feasibility` - the structural walk behind `can_be_handled`
//! - `assembler` - append-only instruction buffer, labels, fragments
//! - `compile` - code generation (quantifiers, disjunctions, lookarounds,
//!   the optional capture-filter pass)
//!
//! The compiler is synchronous and deterministic: identical (tree, flags,
//! config) inputs produce byte-identical programs. Once `can_be_handled`
//! has accepted a tree, any inconsistency discovered during lowering is a
//! bug in this crate and panics rather than degrading.

mod assembler;
mod compile;
mod feasibility;

#[cfg(test)]
mod assembler_tests;
#[cfg(test)]
pub(crate) mod test_utils;

pub use compile::compile;
pub use feasibility::can_be_handled;
pub use skein_bytecode::Program;

/// Compiler configuration, passed explicitly into every entry point.
#[derive(Clone, Debug)]
pub struct Config {
    /// Ceiling on the multiplicative bytecode-replication estimate for
    /// nested quantifiers; trees estimated above it are rejected.
    pub max_replication_factor: usize,
    /// Emit the capture-filter program after the main pattern.
    pub enable_capture_filter_pass: bool,
    /// Allow lookaheads and capture groups inside lookarounds.
    pub allow_lookaround_captures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_replication_factor: 16,
            enable_capture_filter_pass: false,
            allow_lookaround_captures: true,
        }
    }
}

/// Errors surfaced to callers of [`compile`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum CompileError {
    /// The tree was rejected by the feasibility check; the caller should
    /// fall back to a backtracking engine.
    #[error("pattern cannot be handled by the breadth-first engine")]
    Unsupported,
}
