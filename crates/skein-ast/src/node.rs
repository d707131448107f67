//! Syntax tree nodes and the facts the compiler reads off them.

use serde::{Deserialize, Serialize};

/// Largest code unit the engine matches against.
///
/// Code points above this are approximated at the surrogate level by the
/// external parser before the tree reaches the compiler.
pub const MAX_CODE_UNIT: u16 = 0xFFFF;

/// An inclusive range of code units inside a character class.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ClassRange {
    pub from: u16,
    pub to: u16,
}

impl ClassRange {
    pub fn new(from: u16, to: u16) -> Self {
        debug_assert!(from <= to, "inverted class range {from}..{to}");
        Self { from, to }
    }

    /// Single-unit range.
    pub fn single(unit: u16) -> Self {
        Self::new(unit, unit)
    }
}

/// Zero-width assertion kinds.
///
/// The parser resolves `multiline` before building the tree, so `^`/`$`
/// arrive as either the input or the line variant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AssertionKind {
    StartOfInput,
    EndOfInput,
    StartOfLine,
    EndOfLine,
    WordBoundary,
    NonWordBoundary,
}

/// Quantifier matching discipline.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum QuantifierKind {
    Greedy,
    Lazy,
    Possessive,
}

/// Direction of a lookaround assertion.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LookaroundKind {
    Ahead,
    Behind,
}

/// A parsed regexp tree.
///
/// This is a closed set: the compiler matches exhaustively over it and
/// relies on the parser having validated structure (capture indices
/// dense from 1, quantifier/lookaround indices stable and unique).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Node {
    /// Ordered alternatives; earlier alternatives match with higher priority.
    Disjunction(Vec<Node>),
    /// A sequence of nodes matched one after another.
    Alternative(Vec<Node>),
    Assertion(AssertionKind),
    /// Character class built from ranges, e.g. `[a-z0-9]` or `[^ab]`.
    ClassRanges { ranges: Vec<ClassRange>, negated: bool },
    /// A `v`-mode class operand, already flattened to ranges.
    ClassSetOperand {
        ranges: Vec<ClassRange>,
        /// Whether the operand carried multi-character string atoms.
        has_strings: bool,
    },
    /// A `v`-mode set expression, already evaluated to ranges.
    ClassSetExpression {
        ranges: Vec<ClassRange>,
        negated: bool,
        has_strings: bool,
    },
    /// A literal run of code units.
    Atom(Vec<u16>),
    /// A run of text-like elements (atoms and classes).
    Text(Vec<Node>),
    Quantifier {
        min: u32,
        /// `None` means unbounded.
        max: Option<u32>,
        kind: QuantifierKind,
        /// Stable quantifier id assigned by the parser.
        index: u32,
        body: Box<Node>,
    },
    Capture {
        /// 1-based capture group index; group 0 is the whole match.
        index: u16,
        body: Box<Node>,
    },
    /// Non-capturing group.
    Group(Box<Node>),
    Lookaround {
        kind: LookaroundKind,
        positive: bool,
        /// Stable lookaround id assigned by the parser.
        index: u32,
        /// Number of capture groups inside the body.
        capture_count: u16,
        body: Box<Node>,
    },
    BackReference { index: u16 },
    Empty,
}

impl Node {
    /// Whether this node can match the empty string.
    pub fn is_nullable(&self) -> bool {
        match self {
            Node::Disjunction(alts) => alts.iter().any(Node::is_nullable),
            Node::Alternative(seq) | Node::Text(seq) => seq.iter().all(Node::is_nullable),
            Node::Assertion(_) | Node::Lookaround { .. } | Node::Empty => true,
            Node::ClassRanges { .. }
            | Node::ClassSetOperand { .. }
            | Node::ClassSetExpression { .. } => false,
            Node::Atom(units) => units.is_empty(),
            Node::Quantifier { min, body, .. } => *min == 0 || body.is_nullable(),
            Node::Capture { body, .. } | Node::Group(body) => body.is_nullable(),
            // Undefined group references match the empty string; defined
            // ones may not, but back-references never reach the compiler.
            Node::BackReference { .. } => true,
        }
    }

    /// The inclusive register interval `(first, last)` spanned by captures
    /// inside this node, or `None` if the subtree contains no captures.
    ///
    /// Capture `k` owns the start register `2k` and end register `2k + 1`.
    pub fn capture_registers(&self) -> Option<(u16, u16)> {
        fn merge(a: Option<(u16, u16)>, b: Option<(u16, u16)>) -> Option<(u16, u16)> {
            match (a, b) {
                (Some((af, at)), Some((bf, bt))) => Some((af.min(bf), at.max(bt))),
                (x, None) | (None, x) => x,
            }
        }

        match self {
            Node::Disjunction(children)
            | Node::Alternative(children)
            | Node::Text(children) => children
                .iter()
                .fold(None, |acc, child| merge(acc, child.capture_registers())),
            Node::Capture { index, body } => {
                let start = index * 2;
                merge(Some((start, start + 1)), body.capture_registers())
            }
            Node::Quantifier { body, .. }
            | Node::Group(body)
            | Node::Lookaround { body, .. } => body.capture_registers(),
            Node::Assertion(_)
            | Node::ClassRanges { .. }
            | Node::ClassSetOperand { .. }
            | Node::ClassSetExpression { .. }
            | Node::Atom(_)
            | Node::BackReference { .. }
            | Node::Empty => None,
        }
    }

    /// Whether every match of this node starts at the beginning of input.
    ///
    /// Conservative: `false` is always a safe answer, and zero-width
    /// prefixes other than the anchor itself are not looked through.
    pub fn is_anchored_at_start(&self) -> bool {
        match self {
            Node::Assertion(kind) => *kind == AssertionKind::StartOfInput,
            Node::Disjunction(alts) => {
                !alts.is_empty() && alts.iter().all(Node::is_anchored_at_start)
            }
            Node::Alternative(seq) | Node::Text(seq) => {
                seq.first().is_some_and(Node::is_anchored_at_start)
            }
            Node::Quantifier { min, body, .. } => *min > 0 && body.is_anchored_at_start(),
            Node::Capture { body, .. } | Node::Group(body) => body.is_anchored_at_start(),
            _ => false,
        }
    }

    /// Whether every match of this node ends at the end of input.
    ///
    /// Conservative, mirror image of [`Node::is_anchored_at_start`].
    pub fn is_anchored_at_end(&self) -> bool {
        match self {
            Node::Assertion(kind) => *kind == AssertionKind::EndOfInput,
            Node::Disjunction(alts) => {
                !alts.is_empty() && alts.iter().all(Node::is_anchored_at_end)
            }
            Node::Alternative(seq) | Node::Text(seq) => {
                seq.last().is_some_and(Node::is_anchored_at_end)
            }
            Node::Quantifier { min, body, .. } => *min > 0 && body.is_anchored_at_end(),
            Node::Capture { body, .. } | Node::Group(body) => body.is_anchored_at_end(),
            _ => false,
        }
    }
}
