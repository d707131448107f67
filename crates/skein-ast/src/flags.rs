//! Regexp flag set.

use serde::{Deserialize, Serialize};

/// Flags attached to a pattern, as resolved by the external parser.
///
/// The compiler only supports a subset of these; see the feasibility
/// checker in `skein-compiler` for the accepted combinations.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Flags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub unicode_sets: bool,
    pub sticky: bool,
    pub has_indices: bool,
    /// Request for the linear-time engine.
    pub linear: bool,
}
