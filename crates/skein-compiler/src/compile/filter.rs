//! The capture-filter program.
//!
//! After a match, registers written during discarded quantifier
//! iterations can hold stale positions. The filter program is a static
//! tree mirroring the pattern's capture-relevant structure; the VM walks
//! it comparing quantifier clocks and drops registers belonging to
//! iterations older than the winning thread's clocks.
//!
//! The program is emitted breadth first: each node's FILTER_CHILD edges
//! are emitted when the node itself is, and the children's bodies follow
//! in queue order. Subtrees without capture registers are pruned, so a
//! quantifier or lookaround enters the program only if filtering it could
//! change an observable register.

use std::collections::VecDeque;

use skein_ast::Node;

use super::generator::Generator;
use crate::assembler::Label;

impl<'a> Generator<'a> {
    pub(super) fn compile_filter(&mut self, tree: &'a Node) {
        let mut pending: VecDeque<(&'a Node, Label)> = VecDeque::new();

        self.asm.start_fragment();
        self.filter_children(tree, &mut pending);
        while let Some((node, label)) = pending.pop_front() {
            self.asm.bind(label);
            match node {
                Node::Capture { index, body } => {
                    self.asm.filter_group(*index);
                    self.filter_children(body, &mut pending);
                }
                Node::Quantifier { index, body, .. } => {
                    let id = self.quantifier_id(*index);
                    self.asm.filter_quantifier(id);
                    self.filter_children(body, &mut pending);
                }
                Node::Lookaround { index, body, .. } => {
                    self.asm.filter_lookaround(*index);
                    self.filter_children(body, &mut pending);
                }
                _ => panic!("node kind never enters the filter queue"),
            }
        }
        self.asm.end_fragment();
    }

    /// Emit FILTER_CHILD edges for the capture-relevant nodes reachable
    /// from `node` without crossing another capture-relevant node.
    fn filter_children(&mut self, node: &'a Node, pending: &mut VecDeque<(&'a Node, Label)>) {
        match node {
            Node::Disjunction(children)
            | Node::Alternative(children)
            | Node::Text(children) => {
                for child in children {
                    self.filter_children(child, pending);
                }
            }
            Node::Group(body) => self.filter_children(body, pending),
            Node::Capture { .. } => self.enqueue(node, pending),
            Node::Quantifier { body, .. } | Node::Lookaround { body, .. } => {
                if body.capture_registers().is_some() {
                    self.enqueue(node, pending);
                }
            }
            _ => {}
        }
    }

    fn enqueue(&mut self, node: &'a Node, pending: &mut VecDeque<(&'a Node, Label)>) {
        let label = self.asm.new_label();
        self.asm.filter_child(label);
        pending.push_back((node, label));
    }
}
