//! Venue Adapter
//!
//! Capability interface every liquidity venue implements, the slot
//! constraint checks they share, and the closed set of venues the router
//! dispatches to. Adding a venue means adding a `Venue` variant.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::adapters::pump_fun::{PumpfunBuyAdapter, PumpfunSellAdapter};
use crate::config::loader::{Config, ConfigError};
use crate::domain::account_binding::{AccountSlot, VenueEndpoints};
use crate::domain::error::RouterError;
use crate::domain::plan::Dex;
use crate::ports::ledger::LedgerPort;

/// How a slot's address is pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotConstraint {
    /// Any address is accepted
    Unchecked,
    /// Fixed program or well-known PDA
    Address,
    /// Derived from other accounts of the same invocation
    Seeds,
}

/// One position of a venue's account layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: &'static str,
    pub writable: bool,
    pub signer: bool,
    pub constraint: SlotConstraint,
}

impl SlotSpec {
    pub const fn new(name: &'static str, writable: bool, signer: bool, constraint: SlotConstraint) -> Self {
        Self {
            name,
            writable,
            signer,
            constraint,
        }
    }
}

/// Instruction ready for the ledger, plus what it is expected to move
#[derive(Debug, Clone, PartialEq)]
pub struct VenueCall {
    pub instruction: Instruction,
    pub source: Pubkey,
    pub destination: Pubkey,
    /// Output the venue quoted for the input, in destination base units
    pub quoted_out: u64,
}

/// Capabilities of a venue adapter
///
/// `verify` never mutates anything and runs for every venue before the first
/// instruction executes. `encode` runs right before the venue's turn, so it
/// prices against the state left by earlier venues.
pub trait VenueAdapter {
    fn dex(&self) -> Dex;

    /// Ordered slot requirements of the binding window
    fn account_layout(&self) -> &'static [SlotSpec];

    fn required_arity(&self) -> usize {
        self.account_layout().len()
    }

    /// Check every slot constraint and report the token accounts involved
    fn verify<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        ledger: &L,
    ) -> Result<VenueEndpoints, RouterError>;

    /// Build the settlement instruction for `amount_in`
    fn encode<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        amount_in: u64,
        ledger: &L,
    ) -> Result<VenueCall, RouterError>;
}

/// Reject a window whose length does not match the layout
pub fn check_arity(venue: Dex, layout: &[SlotSpec], accounts: &[AccountSlot]) -> Result<(), RouterError> {
    if accounts.len() != layout.len() {
        return Err(RouterError::AccountLayoutMismatch {
            venue,
            expected: layout.len(),
            actual: accounts.len(),
        });
    }
    Ok(())
}

/// Check one slot: mutability, then signer, then its pinned address
pub fn check_slot(spec: &SlotSpec, slot: &AccountSlot, expected: Option<&Pubkey>) -> Result<(), RouterError> {
    if spec.writable && !slot.is_writable {
        return Err(RouterError::MutabilityConstraintViolation {
            slot: spec.name,
            address: slot.address,
        });
    }

    if spec.signer && !slot.is_signer {
        return Err(RouterError::SignerConstraintViolation {
            slot: spec.name,
            address: slot.address,
        });
    }

    match (spec.constraint, expected) {
        (SlotConstraint::Address, Some(expected)) if slot.address != *expected => {
            Err(RouterError::AddressConstraintViolation {
                slot: spec.name,
                expected: *expected,
                actual: slot.address,
            })
        }
        (SlotConstraint::Seeds, Some(expected)) if slot.address != *expected => {
            Err(RouterError::SeedConstraintViolation {
                slot: spec.name,
                expected: *expected,
                actual: slot.address,
            })
        }
        _ => Ok(()),
    }
}

/// Closed set of venues the router dispatches to
#[derive(Debug, Clone)]
pub enum Venue {
    PumpfunBuy(PumpfunBuyAdapter),
    PumpfunSell(PumpfunSellAdapter),
}

impl Venue {
    /// Venue for `dex` bound to a pump.fun deployment
    pub fn pump_fun(dex: Dex, program_id: Pubkey, fee_bps: u16) -> Self {
        match dex {
            Dex::PumpfunBuy => Venue::PumpfunBuy(PumpfunBuyAdapter::new(program_id, fee_bps)),
            Dex::PumpfunSell => Venue::PumpfunSell(PumpfunSellAdapter::new(program_id, fee_bps)),
        }
    }
}

impl VenueAdapter for Venue {
    fn dex(&self) -> Dex {
        match self {
            Venue::PumpfunBuy(adapter) => adapter.dex(),
            Venue::PumpfunSell(adapter) => adapter.dex(),
        }
    }

    fn account_layout(&self) -> &'static [SlotSpec] {
        match self {
            Venue::PumpfunBuy(adapter) => adapter.account_layout(),
            Venue::PumpfunSell(adapter) => adapter.account_layout(),
        }
    }

    fn verify<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        ledger: &L,
    ) -> Result<VenueEndpoints, RouterError> {
        match self {
            Venue::PumpfunBuy(adapter) => adapter.verify(accounts, ledger),
            Venue::PumpfunSell(adapter) => adapter.verify(accounts, ledger),
        }
    }

    fn encode<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        amount_in: u64,
        ledger: &L,
    ) -> Result<VenueCall, RouterError> {
        match self {
            Venue::PumpfunBuy(adapter) => adapter.encode(accounts, amount_in, ledger),
            Venue::PumpfunSell(adapter) => adapter.encode(accounts, amount_in, ledger),
        }
    }
}

/// Venues enabled for this router, looked up by selector
#[derive(Debug, Clone)]
pub struct VenueRegistry {
    venues: Vec<Venue>,
}

impl Default for VenueRegistry {
    fn default() -> Self {
        let program_id = crate::domain::known_programs::pumpfun_program_id();
        Self::new(
            Dex::ALL
                .iter()
                .map(|dex| Venue::pump_fun(*dex, program_id, crate::adapters::pump_fun::DEFAULT_FEE_BPS))
                .collect(),
        )
    }
}

impl VenueRegistry {
    pub fn new(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// Build from the `[venues]` and `[pump_fun]` sections
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let program_id = config.pump_fun.get_program_id()?;
        let venues = config
            .venues
            .selectors()?
            .into_iter()
            .map(|dex| Venue::pump_fun(dex, program_id, config.pump_fun.fee_bps))
            .collect();

        tracing::info!("Venue registry: {:?} via program {}", config.venues.enabled, program_id);
        Ok(Self::new(venues))
    }

    pub fn selectors(&self) -> Vec<Dex> {
        self.venues.iter().map(|venue| venue.dex()).collect()
    }

    pub fn get(&self, dex: Dex) -> Result<&Venue, RouterError> {
        self.venues
            .iter()
            .find(|venue| venue.dex() == dex)
            .ok_or_else(|| RouterError::MalformedPlan(format!("venue {} is not registered", dex)))
    }

    /// Accounts a selector consumes, zero when it is not registered
    pub fn arity(&self, dex: Dex) -> usize {
        self.get(dex).map(|venue| venue.required_arity()).unwrap_or(0)
    }
}
