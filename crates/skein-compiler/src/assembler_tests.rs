//! Tests for label resolution and fragment concatenation.

use skein_bytecode::{InstrIndex, Instruction};

use super::assembler::Assembler;

#[test]
fn forward_and_backward_references_resolve() {
    let mut asm = Assembler::new();
    let body = asm.new_label();
    let end = asm.new_label();

    asm.fork(end);
    asm.bind(body);
    asm.consume_any();
    asm.fork(body);
    asm.bind(end);
    asm.accept();

    assert_eq!(
        asm.finalize(),
        vec![
            Instruction::Fork(InstrIndex(3)),
            Instruction::ConsumeAny,
            Instruction::Fork(InstrIndex(1)),
            Instruction::Accept,
        ]
    );
}

#[test]
fn label_referenced_more_than_once() {
    let mut asm = Assembler::new();
    let target = asm.new_label();
    asm.jmp(target);
    asm.jmp(target);
    asm.bind(target);
    asm.accept();

    assert_eq!(
        asm.finalize(),
        vec![
            Instruction::Jmp(InstrIndex(2)),
            Instruction::Jmp(InstrIndex(2)),
            Instruction::Accept,
        ]
    );
}

#[test]
fn fragments_follow_main_buffer() {
    let mut asm = Assembler::new();
    let side = asm.new_label();

    asm.consume_any();
    asm.start_fragment();
    asm.bind(side);
    asm.fail();
    asm.end_fragment();
    // Emitted after the fragment closed, still lands before it.
    asm.accept();
    asm.jmp(side);

    assert_eq!(
        asm.finalize(),
        vec![
            Instruction::ConsumeAny,
            Instruction::Accept,
            Instruction::Jmp(InstrIndex(3)),
            Instruction::Fail,
        ]
    );
}

#[test]
fn nested_fragment_completes_before_outer() {
    let mut asm = Assembler::new();
    let outer = asm.new_label();
    let inner = asm.new_label();

    asm.accept();
    asm.start_fragment();
    asm.bind(outer);
    asm.jmp(inner);
    asm.start_fragment();
    asm.bind(inner);
    asm.fail();
    asm.end_fragment();
    asm.end_fragment();
    asm.jmp(outer);

    // Completion order: inner fragment first, then outer.
    assert_eq!(
        asm.finalize(),
        vec![
            Instruction::Accept,
            Instruction::Jmp(InstrIndex(3)),
            Instruction::Fail,
            Instruction::Jmp(InstrIndex(2)),
        ]
    );
}

#[test]
fn cross_fragment_references_resolve_both_directions() {
    let mut asm = Assembler::new();
    let in_main = asm.new_label();
    let in_fragment = asm.new_label();

    asm.bind(in_main);
    asm.jmp(in_fragment);
    asm.start_fragment();
    asm.bind(in_fragment);
    asm.jmp(in_main);
    asm.end_fragment();

    assert_eq!(
        asm.finalize(),
        vec![Instruction::Jmp(InstrIndex(1)), Instruction::Jmp(InstrIndex(0))]
    );
}

#[test]
#[should_panic(expected = "bound twice")]
fn binding_a_label_twice_panics() {
    let mut asm = Assembler::new();
    let label = asm.new_label();
    asm.bind(label);
    asm.accept();
    asm.bind(label);
}

#[test]
#[should_panic(expected = "never bound")]
fn finalizing_with_unbound_label_panics() {
    let mut asm = Assembler::new();
    let label = asm.new_label();
    asm.jmp(label);
    asm.finalize();
}

#[test]
#[should_panic(expected = "fragment still open")]
fn finalizing_with_open_fragment_panics() {
    let mut asm = Assembler::new();
    asm.accept();
    asm.start_fragment();
    asm.finalize();
}
