//! Adapters Layer - Venue and ledger implementations
//!
//! - `venue`: Venue capability trait and registry
//! - `pump_fun`: pump.fun bonding-curve buy and sell
//! - `sim`: In-memory ledger executing pump.fun and SPL token instructions

pub mod pump_fun;
pub mod sim;
pub mod venue;

pub use pump_fun::{PumpWindow, PumpfunBuyAdapter, PumpfunSellAdapter};
pub use sim::SimulatedLedger;
pub use venue::{Venue, VenueAdapter, VenueCall, VenueRegistry};
