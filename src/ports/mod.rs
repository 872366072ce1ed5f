//! Ports Layer - Trait definitions for external dependencies
//!
//! Settlements read and mutate chain state only through `LedgerPort`.

pub mod ledger;

pub use ledger::{AccountSnapshot, LedgerError, LedgerPort};
