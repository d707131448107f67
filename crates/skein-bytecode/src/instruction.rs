//! Bytecode instruction definitions.

use serde::{Deserialize, Serialize};
use skein_ast::AssertionKind;

/// Absolute index of an instruction in the final, flattened program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct InstrIndex(pub u32);

impl InstrIndex {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for InstrIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single VM instruction.
///
/// Threads in the VM are prioritized by spawn order: `Fork` spawns a new,
/// lower-priority thread at its target while the current thread continues
/// at the next instruction. That ordering is the only primitive behind
/// greedy/lazy quantifier semantics.
///
/// Instructions are immutable once a program is finalized; the assembler
/// patches jump targets in place only before hand-off.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Instruction {
    /// The current thread found a match.
    Accept,
    /// Kill the current thread.
    Fail,
    /// Zero-width position check; kills the thread on failure.
    Assertion(AssertionKind),
    /// Consume one code unit if it lies in `from..=to`, else kill the thread.
    ConsumeRange { from: u16, to: u16 },
    /// Consume any single code unit.
    ConsumeAny,
    /// Spawn a lower-priority thread at `target`; fall through.
    Fork(InstrIndex),
    Jmp(InstrIndex),
    /// Record the current input position in a capture register.
    SetRegisterToCp(u16),
    /// Mark a capture register as undefined for the current iteration.
    ClearRegister(u16),
    /// Open a zero-width-loop guard; the VM kills threads that come back
    /// to the matching `EndLoop` without consuming input.
    BeginLoop,
    EndLoop,
    /// Stamp a quantifier's clock with the current VM time.
    SetQuantifierClock(u32),
    /// Filter program: node for quantifier `id`.
    FilterQuantifier(u32),
    /// Filter program: node for capture group `id`.
    FilterGroup(u16),
    /// Filter program: node for lookaround `id`.
    FilterLookaround(u32),
    /// Filter program: edge to the child node at `target`.
    FilterChild(InstrIndex),
    /// Begin a lookaround sub-automaton; `reversed` automata run against
    /// the scan direction.
    StartLookaround { id: u32, reversed: bool },
    EndLookaround,
    /// Record the sub-automaton's verdict for the current position.
    WriteLookaroundTable(u32),
    /// Consult lookaround `id`'s table at the current position; kills the
    /// thread unless the entry equals `positive`.
    ReadLookaroundTable { id: u32, positive: bool },
}

impl Instruction {
    /// The jump target carried by this instruction, if any.
    pub fn target(&self) -> Option<InstrIndex> {
        match self {
            Instruction::Fork(t) | Instruction::Jmp(t) | Instruction::FilterChild(t) => Some(*t),
            _ => None,
        }
    }

    /// Whether this instruction belongs to the capture-filter program.
    pub fn is_filter(&self) -> bool {
        matches!(
            self,
            Instruction::FilterQuantifier(_)
                | Instruction::FilterGroup(_)
                | Instruction::FilterLookaround(_)
                | Instruction::FilterChild(_)
        )
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Accept => write!(f, "ACCEPT"),
            Instruction::Fail => write!(f, "FAIL"),
            Instruction::Assertion(kind) => write!(f, "ASSERTION {}", assertion_name(*kind)),
            Instruction::ConsumeRange { from, to } => {
                if from == to {
                    write!(f, "CONSUME_RANGE {from:#06x}")
                } else {
                    write!(f, "CONSUME_RANGE {from:#06x}..{to:#06x}")
                }
            }
            Instruction::ConsumeAny => write!(f, "CONSUME_ANY"),
            Instruction::Fork(t) => write!(f, "FORK -> {t}"),
            Instruction::Jmp(t) => write!(f, "JMP -> {t}"),
            Instruction::SetRegisterToCp(r) => write!(f, "SET_REGISTER_TO_CP r{r}"),
            Instruction::ClearRegister(r) => write!(f, "CLEAR_REGISTER r{r}"),
            Instruction::BeginLoop => write!(f, "BEGIN_LOOP"),
            Instruction::EndLoop => write!(f, "END_LOOP"),
            Instruction::SetQuantifierClock(q) => write!(f, "SET_QUANTIFIER_CLOCK q{q}"),
            Instruction::FilterQuantifier(q) => write!(f, "FILTER_QUANTIFIER q{q}"),
            Instruction::FilterGroup(g) => write!(f, "FILTER_GROUP g{g}"),
            Instruction::FilterLookaround(l) => write!(f, "FILTER_LOOKAROUND l{l}"),
            Instruction::FilterChild(t) => write!(f, "FILTER_CHILD -> {t}"),
            Instruction::StartLookaround { id, reversed } => {
                if *reversed {
                    write!(f, "START_LOOKAROUND l{id} reversed")
                } else {
                    write!(f, "START_LOOKAROUND l{id}")
                }
            }
            Instruction::EndLookaround => write!(f, "END_LOOKAROUND"),
            Instruction::WriteLookaroundTable(l) => write!(f, "WRITE_LOOKAROUND_TABLE l{l}"),
            Instruction::ReadLookaroundTable { id, positive } => {
                let expect = if *positive { "positive" } else { "negative" };
                write!(f, "READ_LOOKAROUND_TABLE l{id} {expect}")
            }
        }
    }
}

fn assertion_name(kind: AssertionKind) -> &'static str {
    match kind {
        AssertionKind::StartOfInput => "start_of_input",
        AssertionKind::EndOfInput => "end_of_input",
        AssertionKind::StartOfLine => "start_of_line",
        AssertionKind::EndOfLine => "end_of_line",
        AssertionKind::WordBoundary => "word_boundary",
        AssertionKind::NonWordBoundary => "non_word_boundary",
    }
}
