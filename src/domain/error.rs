//! Router Errors
//!
//! One error type for every way a settlement invocation can fail. Each
//! variant maps to a stable numeric code. Account-constraint failures reuse
//! the Anchor framework numbers (2000 = mut, 2006 = seeds, ...) so they read
//! the same as the `custom program error: 0x..` lines the runtime logs.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::domain::plan::Dex;
use crate::ports::ledger::LedgerError;

/// Anchor `ConstraintMut`
pub const CONSTRAINT_MUT: u32 = 2000;
/// Anchor `ConstraintSigner`
pub const CONSTRAINT_SIGNER: u32 = 2002;
/// Anchor `ConstraintSeeds`
pub const CONSTRAINT_SEEDS: u32 = 2006;
/// Anchor `ConstraintAddress`
pub const CONSTRAINT_ADDRESS: u32 = 2012;
/// Anchor `AccountNotEnoughKeys`
pub const ACCOUNT_NOT_ENOUGH_KEYS: u32 = 3005;

/// Router-specific codes start here (Anchor custom error offset)
pub const ROUTER_ERROR_OFFSET: u32 = 6000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Malformed swap plan: {0}")]
    MalformedPlan(String),

    #[error("Slippage exceeded: realized {realized} below minimum return {min_return}")]
    SlippageExceeded { realized: u64, min_return: u64 },

    #[error("Source overspent: {spent} debited, plan allows {amount_in}")]
    SourceOverspent { spent: u64, amount_in: u64 },

    #[error("No pre-settlement snapshot captured")]
    GuardNotArmed,

    #[error("Arithmetic overflow while settling route")]
    ArithmeticOverflow,

    #[error("A mut constraint was violated: {slot} ({address}) must be writable")]
    MutabilityConstraintViolation { slot: &'static str, address: Pubkey },

    #[error("A signer constraint was violated: {slot} ({address}) must sign")]
    SignerConstraintViolation { slot: &'static str, address: Pubkey },

    #[error("A seeds constraint was violated: {slot} left {actual}, right {expected}")]
    SeedConstraintViolation {
        slot: &'static str,
        expected: Pubkey,
        actual: Pubkey,
    },

    #[error("An address constraint was violated: {slot} left {actual}, right {expected}")]
    AddressConstraintViolation {
        slot: &'static str,
        expected: Pubkey,
        actual: Pubkey,
    },

    #[error("Account layout mismatch for {venue:?}: expected {expected} accounts, got {actual}")]
    AccountLayoutMismatch {
        venue: Dex,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl RouterError {
    /// Numeric error code as the runtime would report it
    pub fn code(&self) -> u32 {
        match self {
            RouterError::MalformedPlan(_) => ROUTER_ERROR_OFFSET,
            RouterError::SlippageExceeded { .. } => ROUTER_ERROR_OFFSET + 1,
            RouterError::SourceOverspent { .. } => ROUTER_ERROR_OFFSET + 2,
            RouterError::GuardNotArmed => ROUTER_ERROR_OFFSET + 3,
            RouterError::ArithmeticOverflow => ROUTER_ERROR_OFFSET + 4,
            RouterError::InvalidAccountData(_) => ROUTER_ERROR_OFFSET + 5,
            RouterError::Ledger(_) => ROUTER_ERROR_OFFSET + 6,
            RouterError::MutabilityConstraintViolation { .. } => CONSTRAINT_MUT,
            RouterError::SignerConstraintViolation { .. } => CONSTRAINT_SIGNER,
            RouterError::SeedConstraintViolation { .. } => CONSTRAINT_SEEDS,
            RouterError::AddressConstraintViolation { .. } => CONSTRAINT_ADDRESS,
            RouterError::AccountLayoutMismatch { .. } => ACCOUNT_NOT_ENOUGH_KEYS,
        }
    }

    /// Render the code the way the runtime logs a failed instruction
    pub fn program_error(&self) -> String {
        format!("custom program error: {:#x}", self.code())
    }

    /// Check if the failure came from an account constraint rather than the plan or the guard
    pub fn is_account_error(&self) -> bool {
        matches!(
            self,
            RouterError::MutabilityConstraintViolation { .. }
                | RouterError::SignerConstraintViolation { .. }
                | RouterError::SeedConstraintViolation { .. }
                | RouterError::AddressConstraintViolation { .. }
                | RouterError::AccountLayoutMismatch { .. }
                | RouterError::InvalidAccountData(_)
        )
    }
}
