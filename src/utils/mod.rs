//! # Utilities Module
//!
//! String canonicalization for rolled outcomes: rune-name purification,
//! elemental descriptor injection, and potency-string parsing.

pub mod names;
pub mod potency;

pub use names::*;
pub use potency::*;
