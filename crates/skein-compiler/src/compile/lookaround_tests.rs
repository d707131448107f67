//! Tests for lookaround automata placement and shape.

use skein_ast::{AssertionKind, Flags, LookaroundKind};
use skein_bytecode::{InstrIndex, Instruction};

use super::generator::Generator;
use crate::test_utils::{anchored, atom, cap, compile_ok, lookahead, lookaround, lookbehind, seq};
use crate::Config;

use Instruction::*;

#[test]
fn lookbehind_automaton_runs_reversed() {
    // ^(?<=a)b
    let tree = anchored(seq(vec![lookbehind(0, atom("a")), atom("b")]));
    let program = compile_ok(&tree, Flags::default(), 0, &Config::default());
    assert_eq!(
        program.code,
        vec![
            SetRegisterToCp(0),
            Assertion(AssertionKind::StartOfInput),
            ReadLookaroundTable { id: 0, positive: true },
            ConsumeRange { from: 0x62, to: 0x62 },
            SetRegisterToCp(1),
            Accept,
            // automaton
            StartLookaround { id: 0, reversed: true },
            Fork(InstrIndex(9)),
            Jmp(InstrIndex(11)),
            ConsumeAny,
            Fork(InstrIndex(9)),
            ConsumeRange { from: 0x61, to: 0x61 },
            WriteLookaroundTable(0),
            EndLookaround,
        ]
    );
    assert_eq!(program.lookaround_count, 1);
}

#[test]
fn lookahead_automaton_is_not_reversed() {
    let tree = anchored(lookahead(0, atom("a")));
    let program = compile_ok(&tree, Flags::default(), 0, &Config::default());
    let start = program
        .code
        .iter()
        .find(|i| matches!(i, StartLookaround { .. }))
        .unwrap();
    assert_eq!(*start, StartLookaround { id: 0, reversed: false });
}

#[test]
fn lookbehind_body_is_emitted_back_to_front() {
    let tree = anchored(lookbehind(0, atom("ab")));
    let program = compile_ok(&tree, Flags::default(), 0, &Config::default());
    let consumed: Vec<u16> = program
        .code
        .iter()
        .filter_map(|i| match i {
            ConsumeRange { from, .. } => Some(*from),
            _ => None,
        })
        .collect();
    // 'b' before 'a' in the reversed automaton.
    assert_eq!(consumed, vec![0x62, 0x61]);
}

#[test]
fn negative_lookaround_reads_negative_and_skips_captures() {
    let tree = anchored(lookaround(
        LookaroundKind::Ahead,
        false,
        0,
        1,
        cap(1, atom("a")),
    ));
    let program = compile_ok(&tree, Flags::default(), 1, &Config::default());
    assert!(program
        .code
        .contains(&ReadLookaroundTable { id: 0, positive: false }));
    // Boolean pass only; no capture registers are ever written besides
    // the match bounds.
    let writes: Vec<u16> = program
        .code
        .iter()
        .filter_map(|i| match i {
            SetRegisterToCp(r) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(writes, vec![0, 1]);
}

#[test]
fn positive_capturing_lookaround_gets_a_capture_pass() {
    let tree = anchored(lookaround(
        LookaroundKind::Ahead,
        true,
        0,
        1,
        cap(1, atom("a")),
    ));
    let program = compile_ok(&tree, Flags::default(), 1, &Config::default());
    let write_at = program
        .code
        .iter()
        .position(|i| matches!(i, WriteLookaroundTable(0)))
        .unwrap();
    let capture_writes: Vec<usize> = program
        .code
        .iter()
        .enumerate()
        .filter(|(_, i)| matches!(i, SetRegisterToCp(2) | SetRegisterToCp(3)))
        .map(|(at, _)| at)
        .collect();
    assert_eq!(capture_writes.len(), 2);
    // The boolean pass before WRITE stays capture free.
    assert!(capture_writes.iter().all(|&at| at > write_at));
    assert!(matches!(program.code.last(), Some(EndLookaround)));
}

#[test]
fn reversed_capture_pass_writes_end_register_first() {
    let tree = anchored(lookaround(
        LookaroundKind::Behind,
        true,
        0,
        1,
        cap(1, atom("a")),
    ));
    let program = compile_ok(&tree, Flags::default(), 1, &Config::default());
    let writes: Vec<u16> = program
        .code
        .iter()
        .filter_map(|i| match i {
            SetRegisterToCp(r) if *r >= 2 => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(writes, vec![3, 2]);
}

#[test]
fn nested_lookaround_table_is_written_before_it_is_read() {
    // ^(?<=(?<=a)b)c
    let inner = lookbehind(1, atom("a"));
    let outer = lookbehind(0, seq(vec![inner, atom("b")]));
    let tree = anchored(seq(vec![outer, atom("c")]));
    let program = compile_ok(&tree, Flags::default(), 0, &Config::default());

    let write_inner = program
        .code
        .iter()
        .position(|i| matches!(i, WriteLookaroundTable(1)))
        .unwrap();
    let read_inner = program
        .code
        .iter()
        .position(|i| matches!(i, ReadLookaroundTable { id: 1, .. }))
        .unwrap();
    assert!(write_inner < read_inner);
    assert_eq!(program.lookaround_count, 2);
}

#[test]
fn automata_follow_reads_in_order() {
    let tree = anchored(seq(vec![
        lookahead(0, atom("a")),
        lookahead(1, atom("b")),
        atom("c"),
    ]));
    let program = compile_ok(&tree, Flags::default(), 0, &Config::default());
    let starts: Vec<u32> = program
        .code
        .iter()
        .filter_map(|i| match i {
            StartLookaround { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![0, 1]);
    let accept_at = program.code.iter().position(|i| matches!(i, Accept)).unwrap();
    let first_start = program
        .code
        .iter()
        .position(|i| matches!(i, StartLookaround { .. }))
        .unwrap();
    assert!(first_start > accept_at);
}

// The feasibility check is the only gate for lookaround flag and
// capability conflicts; the generator re-asserts them so the two cannot
// drift apart silently.

#[test]
#[should_panic(expected = "escaped the feasibility check")]
fn generator_rejects_lookaround_under_global() {
    let tree = lookbehind(0, atom("a"));
    let config = Config::default();
    let flags = Flags {
        global: true,
        ..Flags::default()
    };
    let mut generator = Generator::new(flags, &config);
    generator.compile_node(&tree);
}

#[test]
#[should_panic(expected = "escaped the feasibility check")]
fn generator_rejects_gated_lookahead() {
    let tree = lookahead(0, atom("a"));
    let config = Config {
        allow_lookaround_captures: false,
        ..Config::default()
    };
    let mut generator = Generator::new(Flags::default(), &config);
    generator.compile_node(&tree);
}

#[test]
fn anchored_lookaround_body_skips_the_any_prefix() {
    // (?=^a) scans from the position itself.
    let tree = anchored(lookahead(0, anchored(atom("a"))));
    let program = compile_ok(&tree, Flags::default(), 0, &Config::default());
    let start = program
        .code
        .iter()
        .position(|i| matches!(i, StartLookaround { .. }))
        .unwrap();
    // No fork chain between START and the body.
    assert_eq!(
        program.code[start + 1],
        Assertion(AssertionKind::StartOfInput)
    );
}
