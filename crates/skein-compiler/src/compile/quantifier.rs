//! Quantifier lowering.
//!
//! There is no counter register in the VM; bounded repetition unrolls the
//! body and unbounded repetition loops over a single copy. Greedy and
//! lazy variants differ only in which continuation the fork leaves at
//! lower priority.
//!
//! Every body copy is entered through the same prologue: the capture
//! start registers owned by the body are cleared (a later iteration must
//! not inherit positions from an earlier one) and the quantifier's clock
//! is stamped, which is what the filter program later compares against.

use skein_ast::{Node, QuantifierKind};

use super::generator::Generator;

impl<'a> Generator<'a> {
    pub(super) fn compile_quantifier(
        &mut self,
        min: u32,
        max: Option<u32>,
        kind: QuantifierKind,
        index: u32,
        body: &'a Node,
    ) {
        let id = self.quantifier_id(index);
        let lazy = match kind {
            QuantifierKind::Greedy => false,
            QuantifierKind::Lazy => true,
            QuantifierKind::Possessive => {
                panic!("possessive quantifier escaped the feasibility check")
            }
        };

        match max {
            Some(max) => {
                for _ in 0..min {
                    self.compile_body(id, body);
                }
                let optional = max - min;
                if optional > 0 {
                    if lazy {
                        self.compile_lazy_repetition(optional, id, body);
                    } else {
                        self.compile_greedy_repetition(optional, id, body);
                    }
                }
            }
            None => {
                if min > 0 && !body.is_nullable() {
                    // A mandatory final iteration lets the loop test its
                    // exit after the body, so one copy serves both the
                    // required and the repeated part.
                    for _ in 0..min - 1 {
                        self.compile_body(id, body);
                    }
                    if lazy {
                        self.compile_lazy_plus_loop(id, body);
                    } else {
                        self.compile_greedy_plus_loop(id, body);
                    }
                } else {
                    for _ in 0..min {
                        self.compile_body(id, body);
                    }
                    if lazy {
                        self.compile_lazy_star(id, body);
                    } else {
                        self.compile_greedy_star(id, body);
                    }
                }
            }
        }
    }

    fn compile_body(&mut self, id: u32, body: &'a Node) {
        if !self.ignore_captures
            && let Some((first, last)) = body.capture_registers()
        {
            // Start registers only; an end register is never read unless
            // its start was written in the same iteration.
            let mut register = first;
            while register <= last {
                self.asm.clear_register(register);
                register += 2;
            }
        }
        self.asm.set_quantifier_clock(id);
        self.compile_node(body);
    }

    /// Body wrapped in the zero-width-loop guard when it can match empty,
    /// since the surrounding loop would otherwise never make progress.
    fn compile_guarded_body(&mut self, id: u32, body: &'a Node) {
        let nullable = body.is_nullable();
        if nullable {
            self.asm.begin_loop();
        }
        self.compile_body(id, body);
        if nullable {
            self.asm.end_loop();
        }
    }

    //       FORK end
    //       <body>
    //       FORK end
    //       <body>
    //     end:
    fn compile_greedy_repetition(&mut self, count: u32, id: u32, body: &'a Node) {
        let end = self.asm.new_label();
        for _ in 0..count {
            self.asm.fork(end);
            self.compile_body(id, body);
        }
        self.asm.bind(end);
    }

    //       FORK body0
    //       JMP end
    //     body0:
    //       <body>
    //       FORK body1
    //       JMP end
    //     body1:
    //       <body>
    //     end:
    fn compile_lazy_repetition(&mut self, count: u32, id: u32, body: &'a Node) {
        let end = self.asm.new_label();
        for _ in 0..count {
            let enter = self.asm.new_label();
            self.asm.fork(enter);
            self.asm.jmp(end);
            self.asm.bind(enter);
            self.compile_body(id, body);
        }
        self.asm.bind(end);
    }

    //     begin:
    //       FORK end
    //       <body>
    //       JMP begin
    //     end:
    fn compile_greedy_star(&mut self, id: u32, body: &'a Node) {
        let begin = self.asm.new_label();
        let end = self.asm.new_label();
        self.asm.bind(begin);
        self.asm.fork(end);
        self.compile_guarded_body(id, body);
        self.asm.jmp(begin);
        self.asm.bind(end);
    }

    //       FORK enter
    //       JMP end
    //     enter:
    //       <body>
    //       FORK enter
    //     end:
    fn compile_lazy_star(&mut self, id: u32, body: &'a Node) {
        let enter = self.asm.new_label();
        let end = self.asm.new_label();
        self.asm.fork(enter);
        self.asm.jmp(end);
        self.asm.bind(enter);
        self.compile_guarded_body(id, body);
        self.asm.fork(enter);
        self.asm.bind(end);
    }

    //     begin:
    //       <body>
    //       FORK end
    //       JMP begin
    //     end:
    fn compile_greedy_plus_loop(&mut self, id: u32, body: &'a Node) {
        let begin = self.asm.new_label();
        let end = self.asm.new_label();
        self.asm.bind(begin);
        self.compile_body(id, body);
        self.asm.fork(end);
        self.asm.jmp(begin);
        self.asm.bind(end);
    }

    //     begin:
    //       <body>
    //       FORK begin
    fn compile_lazy_plus_loop(&mut self, id: u32, body: &'a Node) {
        let begin = self.asm.new_label();
        self.asm.bind(begin);
        self.compile_body(id, body);
        self.asm.fork(begin);
    }
}
