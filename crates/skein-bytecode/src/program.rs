//! The compiled program handed to the interpreter.

use serde::{Deserialize, Serialize};

use crate::instruction::Instruction;

/// Structural defects detected by [`Program::verify`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("instruction {at}: jump target {target} out of bounds (len {len})")]
    DanglingJump { at: usize, target: u32, len: usize },
    #[error("instruction {at}: register r{register} out of bounds (count {count})")]
    RegisterOutOfBounds { at: usize, register: u16, count: u16 },
    #[error("instruction {at}: quantifier q{id} out of bounds (count {count})")]
    QuantifierOutOfBounds { at: usize, id: u32, count: u32 },
    #[error("instruction {at}: lookaround l{id} out of bounds (count {count})")]
    LookaroundOutOfBounds { at: usize, id: u32, count: u32 },
    #[error("instruction {at}: group g{id} has no register pair (register count {count})")]
    GroupOutOfBounds { at: usize, id: u16, count: u16 },
    #[error("program is empty")]
    Empty,
}

/// A finalized instruction sequence plus the resource counts the
/// interpreter needs to size its register file, quantifier clocks, and
/// lookaround tables.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Program {
    pub code: Vec<Instruction>,
    /// Registers 0 and 1 hold the whole-match boundaries; each capture
    /// group `k` owns registers `2k` and `2k + 1`.
    pub register_count: u16,
    pub quantifier_count: u32,
    pub lookaround_count: u32,
}

impl Program {
    /// Validate structural consistency: all jump targets land inside the
    /// program and all register/quantifier/lookaround ids are under the
    /// declared counts.
    pub fn verify(&self) -> Result<(), ProgramError> {
        if self.code.is_empty() {
            return Err(ProgramError::Empty);
        }
        let len = self.code.len();
        for (at, instr) in self.code.iter().enumerate() {
            if let Some(target) = instr.target()
                && target.as_usize() >= len
            {
                return Err(ProgramError::DanglingJump {
                    at,
                    target: target.0,
                    len,
                });
            }
            match *instr {
                Instruction::SetRegisterToCp(register)
                | Instruction::ClearRegister(register) => {
                    if register >= self.register_count {
                        return Err(ProgramError::RegisterOutOfBounds {
                            at,
                            register,
                            count: self.register_count,
                        });
                    }
                }
                Instruction::SetQuantifierClock(id) | Instruction::FilterQuantifier(id) => {
                    if id >= self.quantifier_count {
                        return Err(ProgramError::QuantifierOutOfBounds {
                            at,
                            id,
                            count: self.quantifier_count,
                        });
                    }
                }
                Instruction::FilterLookaround(id)
                | Instruction::WriteLookaroundTable(id)
                | Instruction::StartLookaround { id, .. }
                | Instruction::ReadLookaroundTable { id, .. } => {
                    if id >= self.lookaround_count {
                        return Err(ProgramError::LookaroundOutOfBounds {
                            at,
                            id,
                            count: self.lookaround_count,
                        });
                    }
                }
                Instruction::FilterGroup(id) => {
                    if u32::from(id) * 2 + 1 >= u32::from(self.register_count) {
                        return Err(ProgramError::GroupOutOfBounds {
                            at,
                            id,
                            count: self.register_count,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
