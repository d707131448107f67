//! Regexp syntax tree consumed by the skein compiler.
//!
//! The tree is produced by an external parser and arrives here already
//! validated: this crate only defines the closed node type, the flag set,
//! and the read-only node facts (nullability, capture register spans,
//! anchoredness) the compiler consults.

mod flags;
mod node;


pub use flags::Flags;
pub use node::{
    AssertionKind, ClassRange, LookaroundKind, MAX_CODE_UNIT, Node, QuantifierKind,
};
