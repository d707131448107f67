//! Static feasibility analysis for the breadth-first engine.
//!
//! Decides, before any bytecode is emitted, whether a tree can be matched
//! without backtracking. Rejection is the user-facing failure mode of the
//! whole compiler: everything past this check treats the tree as valid.

use skein_ast::{Flags, LookaroundKind, Node, QuantifierKind};

use crate::Config;

/// Whether `tree` can be compiled for the breadth-first VM.
///
/// Pure: no allocation outlives the call and the tree is not modified.
pub fn can_be_handled(tree: &Node, flags: Flags, config: &Config) -> bool {
    if !are_suitable_flags(flags) {
        return false;
    }
    let mut checker = Checker {
        flags,
        config,
        replication: 1,
    };
    checker.check(tree)
}

/// Case folding and `v`-mode class semantics are unimplemented; the
/// indices flag changes the exec result shape, which is the caller's
/// concern, but is rejected here until the interpreter reports enough
/// for it.
fn are_suitable_flags(flags: Flags) -> bool {
    !(flags.ignore_case || flags.unicode_sets || flags.has_indices)
}

struct Checker<'c> {
    flags: Flags,
    config: &'c Config,
    /// Running multiplicative estimate of how many times the bytecode of
    /// the node currently being visited will be duplicated by enclosing
    /// quantifiers.
    replication: u64,
}

impl Checker<'_> {
    fn check(&mut self, node: &Node) -> bool {
        match node {
            Node::Disjunction(children)
            | Node::Alternative(children)
            | Node::Text(children) => children.iter().all(|child| self.check(child)),

            Node::Assertion(_) | Node::ClassRanges { .. } | Node::Atom(_) | Node::Empty => true,

            Node::ClassSetOperand { has_strings, .. }
            | Node::ClassSetExpression { has_strings, .. } => !has_strings,

            // Requires backtracking.
            Node::BackReference { .. } => false,

            Node::Capture { body, .. } | Node::Group(body) => self.check(body),

            Node::Quantifier {
                min,
                max,
                kind,
                body,
                ..
            } => self.check_quantifier(*min, *max, *kind, body),

            Node::Lookaround {
                kind,
                body,
                ..
            } => {
                // Lookaround tables assume a single, non-resumable scan.
                if self.flags.global || self.flags.sticky {
                    return false;
                }
                let needs_capability =
                    *kind == LookaroundKind::Ahead || body.capture_registers().is_some();
                if needs_capability && !self.config.allow_lookaround_captures {
                    return false;
                }
                self.check(body)
            }
        }
    }

    /// Optional repetition is compiled by replicating the body's bytecode,
    /// so the number of copies grows multiplicatively with quantifier
    /// nesting. The running product is bounded by
    /// `config.max_replication_factor`; the bound is per branch, so the
    /// pre-visit product is restored after the body.
    fn check_quantifier(
        &mut self,
        min: u32,
        max: Option<u32>,
        kind: QuantifierKind,
        body: &Node,
    ) -> bool {
        let ceiling = self.config.max_replication_factor as u64;

        // Rule out huge bounds before multiplying, which also guards the
        // product arithmetic below.
        if u64::from(min) > ceiling {
            return false;
        }
        if let Some(max) = max
            && u64::from(max) > ceiling
        {
            return false;
        }

        let local_replication = match max {
            Some(max) => u64::from(max),
            // An unbounded quantifier costs its mandatory prefix plus the
            // star copy. When the body cannot match empty and the
            // quantifier is not itself under replication, it compiles to
            // the single-copy loop instead (see compile/quantifier.rs)
            // and only the mandatory copies count.
            None if min > 0 && self.replication == 1 && !body.is_nullable() => {
                u64::from(min.max(1))
            }
            None => u64::from(min) + 1,
        };

        let before = self.replication;
        self.replication = before.saturating_mul(local_replication);
        if self.replication > ceiling {
            return false;
        }

        let ok = match kind {
            QuantifierKind::Greedy | QuantifierKind::Lazy => self.check(body),
            // Unclear whether possessive semantics are expressible in
            // breadth-first mode at all; RE2 rejects it too.
            QuantifierKind::Possessive => false,
        };

        self.replication = before;
        ok
    }
}
