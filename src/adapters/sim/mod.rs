//! Simulated Ledger
//!
//! In-memory `LedgerPort` used by tests and dry runs. It executes the
//! pump.fun buy and sell instructions against bonding-curve reserves and SPL
//! token transfers, and gives callers transaction semantics through
//! `SimulatedLedger::process_transaction`.

mod ledger;
mod pump;
mod token;

pub use ledger::SimulatedLedger;
