//! Year-end withholding slip (源泉徴収票) validation.
//!
//! Records are read from a slip export, every derived amount is recomputed
//! with the published formulas, and mismatches are reported per check.

pub mod core;

pub use crate::core::*;
