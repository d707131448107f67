//! Append-only bytecode assembler with labels and code fragments.
//!
//! Jump targets are emitted symbolically: a [`Label`] is a fresh id, bound
//! to an instruction-stream position at most once, and resolved to an
//! absolute index in a single pass at finalization. Resolution is kept in
//! side tables (bound positions plus a pending-patch list) so instruction
//! payloads are never aliased as linked-list storage.
//!
//! Fragments support out-of-line code sections: `start_fragment` suspends
//! the buffer being built and `end_fragment` completes the fresh one onto
//! an ordered side list. Finalization concatenates the main buffer
//! followed by completed fragments in completion order. A fragment opened
//! while another is in progress completes first, so it is concatenated
//! earlier; lookaround compilation relies on this to place a nested
//! table-writing automaton before the automaton that reads its table.

use skein_ast::AssertionKind;
use skein_bytecode::{InstrIndex, Instruction};

/// A symbolic jump target. Must be bound exactly once before the
/// assembler is finalized; both double binding and finalizing with an
/// unbound label are invariant violations and panic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label(u32);

/// A position inside a not-yet-concatenated instruction stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Position {
    fragment: u32,
    offset: u32,
}

struct Buffer {
    id: u32,
    code: Vec<Instruction>,
}

pub struct Assembler {
    current: Buffer,
    /// Buffers suspended by `start_fragment`, innermost last.
    suspended: Vec<Buffer>,
    /// Finished fragments, in completion order.
    completed: Vec<Buffer>,
    next_fragment: u32,
    /// Bound position per label id; `None` until bound.
    bound: Vec<Option<Position>>,
    /// Instruction positions whose payload awaits label resolution.
    patches: Vec<(Position, Label)>,
}

/// Placeholder payload for not-yet-resolved jumps. Never survives
/// `finalize`.
const UNRESOLVED: InstrIndex = InstrIndex(u32::MAX);

impl Assembler {
    pub fn new() -> Self {
        Self {
            current: Buffer {
                id: 0,
                code: Vec::new(),
            },
            suspended: Vec::new(),
            completed: Vec::new(),
            next_fragment: 1,
            bound: Vec::new(),
            patches: Vec::new(),
        }
    }

    pub fn new_label(&mut self) -> Label {
        let label = Label(self.bound.len() as u32);
        self.bound.push(None);
        label
    }

    /// Bind `label` to the next emitted instruction's position.
    pub fn bind(&mut self, label: Label) {
        let slot = &mut self.bound[label.0 as usize];
        if slot.is_some() {
            panic!("label {} bound twice", label.0);
        }
        *slot = Some(Position {
            fragment: self.current.id,
            offset: self.current.code.len() as u32,
        });
    }

    fn emit(&mut self, instruction: Instruction) {
        self.current.code.push(instruction);
    }

    fn emit_jump(&mut self, make: fn(InstrIndex) -> Instruction, target: Label) {
        let position = Position {
            fragment: self.current.id,
            offset: self.current.code.len() as u32,
        };
        self.patches.push((position, target));
        self.emit(make(UNRESOLVED));
    }

    pub fn accept(&mut self) {
        self.emit(Instruction::Accept);
    }

    pub fn fail(&mut self) {
        self.emit(Instruction::Fail);
    }

    pub fn assertion(&mut self, kind: AssertionKind) {
        self.emit(Instruction::Assertion(kind));
    }

    pub fn consume_range(&mut self, from: u16, to: u16) {
        self.emit(Instruction::ConsumeRange { from, to });
    }

    pub fn consume_any(&mut self) {
        self.emit(Instruction::ConsumeAny);
    }

    pub fn fork(&mut self, target: Label) {
        self.emit_jump(Instruction::Fork, target);
    }

    pub fn jmp(&mut self, target: Label) {
        self.emit_jump(Instruction::Jmp, target);
    }

    pub fn set_register_to_cp(&mut self, register: u16) {
        self.emit(Instruction::SetRegisterToCp(register));
    }

    pub fn clear_register(&mut self, register: u16) {
        self.emit(Instruction::ClearRegister(register));
    }

    pub fn begin_loop(&mut self) {
        self.emit(Instruction::BeginLoop);
    }

    pub fn end_loop(&mut self) {
        self.emit(Instruction::EndLoop);
    }

    pub fn set_quantifier_clock(&mut self, quantifier_id: u32) {
        self.emit(Instruction::SetQuantifierClock(quantifier_id));
    }

    pub fn filter_quantifier(&mut self, quantifier_id: u32) {
        self.emit(Instruction::FilterQuantifier(quantifier_id));
    }

    pub fn filter_group(&mut self, group_id: u16) {
        self.emit(Instruction::FilterGroup(group_id));
    }

    pub fn filter_lookaround(&mut self, lookaround_id: u32) {
        self.emit(Instruction::FilterLookaround(lookaround_id));
    }

    pub fn filter_child(&mut self, target: Label) {
        self.emit_jump(Instruction::FilterChild, target);
    }

    pub fn start_lookaround(&mut self, lookaround_id: u32, reversed: bool) {
        self.emit(Instruction::StartLookaround {
            id: lookaround_id,
            reversed,
        });
    }

    pub fn end_lookaround(&mut self) {
        self.emit(Instruction::EndLookaround);
    }

    pub fn write_lookaround_table(&mut self, lookaround_id: u32) {
        self.emit(Instruction::WriteLookaroundTable(lookaround_id));
    }

    pub fn read_lookaround_table(&mut self, lookaround_id: u32, positive: bool) {
        self.emit(Instruction::ReadLookaroundTable {
            id: lookaround_id,
            positive,
        });
    }

    /// Suspend the buffer being built and open a fresh one.
    pub fn start_fragment(&mut self) {
        let id = self.next_fragment;
        self.next_fragment += 1;
        let fresh = Buffer {
            id,
            code: Vec::new(),
        };
        self.suspended.push(std::mem::replace(&mut self.current, fresh));
    }

    /// Complete the buffer opened by the matching `start_fragment` and
    /// resume the suspended one.
    pub fn end_fragment(&mut self) {
        let resumed = self
            .suspended
            .pop()
            .unwrap_or_else(|| panic!("end_fragment without a matching start_fragment"));
        let finished = std::mem::replace(&mut self.current, resumed);
        self.completed.push(finished);
    }

    /// Concatenate the main buffer and all completed fragments, resolve
    /// every label reference, and return the flattened program.
    pub fn finalize(self) -> Vec<Instruction> {
        if !self.suspended.is_empty() {
            panic!("fragment still open at finalize");
        }

        // Absolute base index per fragment id, main buffer first, then
        // completed fragments in completion order.
        let mut bases = vec![0u32; self.next_fragment as usize];
        let mut code = self.current.code;
        for fragment in &self.completed {
            bases[fragment.id as usize] = code.len() as u32;
            code.extend_from_slice(&fragment.code);
        }

        let resolve = |position: Position| bases[position.fragment as usize] + position.offset;

        for (position, label) in &self.patches {
            let target = self.bound[label.0 as usize]
                .unwrap_or_else(|| panic!("label {} never bound", label.0));
            let resolved = InstrIndex(resolve(target));
            let instruction = &mut code[resolve(*position) as usize];
            match instruction {
                Instruction::Fork(t) | Instruction::Jmp(t) | Instruction::FilterChild(t) => {
                    *t = resolved;
                }
                other => panic!("patched instruction {other} carries no jump target"),
            }
        }

        // Unreferenced labels must still have been bound; an unbound
        // label means a construct was left half-emitted.
        for (id, slot) in self.bound.iter().enumerate() {
            if slot.is_none() {
                panic!("label {id} never bound");
            }
        }

        code
    }
}
