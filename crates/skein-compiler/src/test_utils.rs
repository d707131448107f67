//! Tree-building helpers shared by the compiler tests.

use skein_ast::{AssertionKind, ClassRange, Flags, LookaroundKind, Node, QuantifierKind};
use skein_bytecode::Program;

use crate::{compile, Config};

pub(crate) fn atom(text: &str) -> Node {
    Node::Atom(text.encode_utf16().collect())
}

pub(crate) fn seq(children: Vec<Node>) -> Node {
    Node::Alternative(children)
}

pub(crate) fn disj(children: Vec<Node>) -> Node {
    Node::Disjunction(children)
}

pub(crate) fn group(body: Node) -> Node {
    Node::Group(Box::new(body))
}

pub(crate) fn cap(index: u16, body: Node) -> Node {
    Node::Capture {
        index,
        body: Box::new(body),
    }
}

pub(crate) fn quant(min: u32, max: Option<u32>, kind: QuantifierKind, index: u32, body: Node) -> Node {
    Node::Quantifier {
        min,
        max,
        kind,
        index,
        body: Box::new(body),
    }
}

pub(crate) fn star(index: u32, body: Node) -> Node {
    quant(0, None, QuantifierKind::Greedy, index, body)
}

pub(crate) fn lazy_star(index: u32, body: Node) -> Node {
    quant(0, None, QuantifierKind::Lazy, index, body)
}

pub(crate) fn plus(index: u32, body: Node) -> Node {
    quant(1, None, QuantifierKind::Greedy, index, body)
}

pub(crate) fn class(ranges: &[(u16, u16)], negated: bool) -> Node {
    Node::ClassRanges {
        ranges: ranges.iter().map(|&(from, to)| ClassRange::new(from, to)).collect(),
        negated,
    }
}

pub(crate) fn lookaround(
    kind: LookaroundKind,
    positive: bool,
    index: u32,
    capture_count: u16,
    body: Node,
) -> Node {
    Node::Lookaround {
        kind,
        positive,
        index,
        capture_count,
        body: Box::new(body),
    }
}

pub(crate) fn lookahead(index: u32, body: Node) -> Node {
    lookaround(LookaroundKind::Ahead, true, index, 0, body)
}

pub(crate) fn lookbehind(index: u32, body: Node) -> Node {
    lookaround(LookaroundKind::Behind, true, index, 0, body)
}

/// `^` in front of the body, to suppress the any-prefix in tests that
/// pin exact instruction indices.
pub(crate) fn anchored(body: Node) -> Node {
    seq(vec![Node::Assertion(AssertionKind::StartOfInput), body])
}

pub(crate) fn sticky() -> Flags {
    Flags {
        sticky: true,
        ..Flags::default()
    }
}

/// Compile and insist the result is well formed.
pub(crate) fn compile_ok(tree: &Node, flags: Flags, capture_count: u16, config: &Config) -> Program {
    let program = compile(tree, flags, capture_count, config).unwrap();
    program.verify().unwrap();
    program
}
