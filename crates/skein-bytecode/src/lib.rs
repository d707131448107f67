//! Bytecode format for the skein breadth-first regexp VM.
//!
//! This crate contains:
//! - Instruction definitions and the `InstrIndex` address newtype
//! - The `Program` hand-off record consumed by the interpreter
//! - Structural verification (`Program::verify`)
//! - A human-readable dump for debugging and tests

mod dump;
mod instruction;
mod program;


pub use dump::dump;
pub use instruction::{InstrIndex, Instruction};
pub use program::{Program, ProgramError};
