//! Lookaround lowering.
//!
//! A lookaround contributes a single READ_LOOKAROUND_TABLE instruction
//! at its position in the enclosing pattern, plus a standalone
//! sub-automaton that fills the table the READ consults. Lookbehinds run
//! reversed, with their bodies emitted back to front.
//!
//! The automaton shape:
//!
//! ```text
//! START_LOOKAROUND l<id> [reversed]
//! [lazy any-prefix]            unless the body is anchored
//! <body>                       captures suppressed
//! WRITE_LOOKAROUND_TABLE l<id>
//! [lazy any-prefix]            capture pass, positive lookarounds
//! <body>                         with captures only
//! END_LOOKAROUND
//! ```
//!
//! Automata for top-level lookarounds are queued and emitted after the
//! main ACCEPT in READ order. A lookaround met while already inside an
//! automaton is emitted immediately as a nested fragment, which completes
//! first and therefore lands ahead of its enclosing automaton: a table is
//! always written by earlier code than any code reading it.

use skein_ast::{LookaroundKind, Node};

use super::generator::Generator;

impl<'a> Generator<'a> {
    pub(super) fn compile_lookaround(&mut self, node: &'a Node) {
        let Node::Lookaround {
            kind,
            positive,
            index,
            body,
            ..
        } = node
        else {
            panic!("compile_lookaround on a non-lookaround node")
        };

        assert!(
            !self.flags.global && !self.flags.sticky,
            "lookaround under global or sticky escaped the feasibility check"
        );
        if *kind == LookaroundKind::Ahead || body.capture_registers().is_some() {
            assert!(
                self.config.allow_lookaround_captures,
                "gated lookaround escaped the feasibility check"
            );
        }

        self.asm.read_lookaround_table(*index, *positive);
        self.note_lookaround(*index);

        if self.scheduled.insert(*index) {
            if self.inside_lookaround {
                self.compile_automaton(node);
            } else {
                self.queue.push_back(node);
            }
        }
    }

    pub(super) fn drain_lookarounds(&mut self) {
        while let Some(node) = self.queue.pop_front() {
            self.compile_automaton(node);
        }
    }

    fn compile_automaton(&mut self, node: &'a Node) {
        let Node::Lookaround {
            kind,
            positive,
            index,
            body,
            ..
        } = node
        else {
            panic!("compile_automaton on a non-lookaround node")
        };

        let reversed = *kind == LookaroundKind::Behind;
        let anchored = if reversed {
            body.is_anchored_at_end()
        } else {
            body.is_anchored_at_start()
        };

        self.asm.start_fragment();
        self.asm.start_lookaround(*index, reversed);

        if !anchored {
            self.compile_any_prefix();
        }
        self.with_mode(reversed, true, |generator| generator.compile_node(body));
        self.asm.write_lookaround_table(*index);

        // Negative lookarounds contribute no captures; a failed body
        // leaves nothing to report.
        if *positive && body.capture_registers().is_some() {
            if !anchored {
                self.compile_any_prefix();
            }
            self.with_mode(reversed, false, |generator| generator.compile_node(body));
        }

        self.asm.end_lookaround();
        self.asm.end_fragment();
    }

    fn with_mode(
        &mut self,
        reverse: bool,
        ignore_captures: bool,
        emit: impl FnOnce(&mut Self),
    ) {
        let saved = (self.reverse, self.ignore_captures, self.inside_lookaround);
        self.reverse = reverse;
        self.ignore_captures = ignore_captures;
        self.inside_lookaround = true;
        emit(self);
        (self.reverse, self.ignore_captures, self.inside_lookaround) = saved;
    }
}
