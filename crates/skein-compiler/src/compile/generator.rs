//! The code generator core: tree walk, sequences, alternations, classes
//! and captures. Quantifiers, lookarounds and the filter program live in
//! their sibling modules as `impl Generator` blocks.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use skein_ast::{ClassRange, Flags, MAX_CODE_UNIT, Node};
use skein_bytecode::Program;

use crate::assembler::Assembler;
use crate::Config;

/// Single-use code generator. Feasibility has already accepted the tree
/// by the time a `Generator` sees it, so structural surprises here are
/// compiler bugs and panic.
pub(super) struct Generator<'a> {
    pub(super) asm: Assembler,
    /// Carried for drift detection only: lookaround emission re-asserts
    /// the conditions the feasibility check vouched for.
    pub(super) flags: Flags,
    pub(super) config: &'a Config,
    /// Emit sequence contents back to front. Set while compiling the
    /// bodies of reversed lookaround automata.
    pub(super) reverse: bool,
    /// Suppress capture register writes. Set during the boolean pass of
    /// lookaround automata, whose threads only answer yes or no.
    pub(super) ignore_captures: bool,
    /// Whether emission is currently inside a lookaround automaton.
    pub(super) inside_lookaround: bool,
    /// Top-level lookarounds waiting for their automata, in the order
    /// their READs were emitted.
    pub(super) queue: VecDeque<&'a Node>,
    /// Lookaround ids whose automata are emitted or queued.
    pub(super) scheduled: HashSet<u32>,
    /// Parser quantifier index to dense clock id, in first-emission order.
    pub(super) quantifier_ids: IndexMap<u32, u32>,
    /// Highest lookaround id referenced so far.
    pub(super) max_lookaround: Option<u32>,
}

impl<'a> Generator<'a> {
    pub(super) fn new(flags: Flags, config: &'a Config) -> Self {
        Self {
            asm: Assembler::new(),
            flags,
            config,
            reverse: false,
            ignore_captures: false,
            inside_lookaround: false,
            queue: VecDeque::new(),
            scheduled: HashSet::new(),
            quantifier_ids: IndexMap::new(),
            max_lookaround: None,
        }
    }

    pub(super) fn compile_node(&mut self, node: &'a Node) {
        match node {
            Node::Disjunction(alternatives) => {
                self.compile_disjunction(alternatives.len(), |generator, i| {
                    generator.compile_node(&alternatives[i]);
                });
            }

            Node::Alternative(children) | Node::Text(children) => {
                self.compile_sequence(children);
            }

            Node::Assertion(kind) => self.asm.assertion(*kind),

            Node::ClassRanges { ranges, negated } => self.compile_class(ranges, *negated),

            Node::ClassSetOperand { ranges, has_strings } => {
                assert!(!*has_strings, "class strings escaped the feasibility check");
                self.compile_class(ranges, false);
            }

            Node::ClassSetExpression {
                ranges,
                negated,
                has_strings,
            } => {
                assert!(!*has_strings, "class strings escaped the feasibility check");
                self.compile_class(ranges, *negated);
            }

            Node::Atom(units) => {
                if self.reverse {
                    for &unit in units.iter().rev() {
                        self.asm.consume_range(unit, unit);
                    }
                } else {
                    for &unit in units {
                        self.asm.consume_range(unit, unit);
                    }
                }
            }

            Node::Quantifier {
                min,
                max,
                kind,
                index,
                body,
            } => self.compile_quantifier(*min, *max, *kind, *index, body),

            Node::Capture { index, body } => self.compile_capture(*index, body),

            Node::Group(body) => self.compile_node(body),

            Node::Lookaround { .. } => self.compile_lookaround(node),

            Node::BackReference { .. } => {
                panic!("back reference escaped the feasibility check")
            }

            Node::Empty => {}
        }
    }

    fn compile_sequence(&mut self, children: &'a [Node]) {
        if self.reverse {
            for child in children.iter().rev() {
                self.compile_node(child);
            }
        } else {
            for child in children {
                self.compile_node(child);
            }
        }
    }

    /// Emit `count` alternatives as a fork chain. Earlier alternatives
    /// keep higher thread priority; the last one falls through. Zero
    /// alternatives can never match, so the thread is killed outright.
    pub(super) fn compile_disjunction(
        &mut self,
        count: usize,
        mut emit_alternative: impl FnMut(&mut Self, usize),
    ) {
        if count == 0 {
            self.asm.fail();
            return;
        }
        let end = self.asm.new_label();
        for i in 0..count - 1 {
            let next = self.asm.new_label();
            self.asm.fork(next);
            emit_alternative(self, i);
            self.asm.jmp(end);
            self.asm.bind(next);
        }
        emit_alternative(self, count - 1);
        self.asm.bind(end);
    }

    fn compile_class(&mut self, ranges: &[ClassRange], negated: bool) {
        let mut ranges = canonicalize(ranges);
        if negated {
            ranges = complement(&ranges);
        }
        self.compile_disjunction(ranges.len(), |generator, i| {
            generator.asm.consume_range(ranges[i].from, ranges[i].to);
        });
    }

    fn compile_capture(&mut self, index: u16, body: &'a Node) {
        if self.ignore_captures {
            self.compile_node(body);
            return;
        }
        let start = index * 2;
        let end = start + 1;
        if self.reverse {
            // Reversed emission runs the body back to front, so the end
            // position is known first.
            self.asm.set_register_to_cp(end);
            self.compile_node(body);
            self.asm.set_register_to_cp(start);
        } else {
            self.asm.set_register_to_cp(start);
            self.compile_node(body);
            self.asm.set_register_to_cp(end);
        }
    }

    /// Lazy `.*` in front of an unanchored automaton: every skipped code
    /// unit costs one lower-priority fork, so earlier match starts win.
    pub(super) fn compile_any_prefix(&mut self) {
        let body = self.asm.new_label();
        let end = self.asm.new_label();
        self.asm.fork(body);
        self.asm.jmp(end);
        self.asm.bind(body);
        self.asm.consume_any();
        self.asm.fork(body);
        self.asm.bind(end);
    }

    /// Dense clock id for a parser-assigned quantifier index, allocating
    /// on first use.
    pub(super) fn quantifier_id(&mut self, index: u32) -> u32 {
        let next = self.quantifier_ids.len() as u32;
        *self.quantifier_ids.entry(index).or_insert(next)
    }

    pub(super) fn note_lookaround(&mut self, id: u32) {
        self.max_lookaround = Some(self.max_lookaround.map_or(id, |max| max.max(id)));
    }

    pub(super) fn into_program(self, capture_count: u16) -> Program {
        let register_count = (u32::from(capture_count) + 1) * 2;
        let register_count = u16::try_from(register_count)
            .unwrap_or_else(|_| panic!("register file for {capture_count} captures exceeds u16"));
        Program {
            code: self.asm.finalize(),
            register_count,
            quantifier_count: self.quantifier_ids.len() as u32,
            lookaround_count: self.max_lookaround.map_or(0, |max| max + 1),
        }
    }
}

/// Sort ranges and merge overlapping or adjacent ones, so emission order
/// and count do not depend on how the parser happened to order the class.
fn canonicalize(ranges: &[ClassRange]) -> Vec<ClassRange> {
    let mut sorted: Vec<ClassRange> = ranges.to_vec();
    sorted.sort_by_key(|range| (range.from, range.to));

    let mut merged: Vec<ClassRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if u32::from(range.from) <= u32::from(last.to) + 1 => {
                last.to = last.to.max(range.to);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Complement of a canonical range list over the full code unit space.
fn complement(ranges: &[ClassRange]) -> Vec<ClassRange> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut next: u32 = 0;
    for range in ranges {
        if u32::from(range.from) > next {
            out.push(ClassRange::new(next as u16, range.from - 1));
        }
        next = u32::from(range.to) + 1;
    }
    if next <= u32::from(MAX_CODE_UNIT) {
        out.push(ClassRange::new(next as u16, MAX_CODE_UNIT));
    }
    out
}
