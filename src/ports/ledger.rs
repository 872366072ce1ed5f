//! Ledger Port
//!
//! The runtime the router settles against. Account state is read and venue
//! instructions are executed through this trait; the router never holds
//! global state of its own. Calls are synchronous: everything the core needs
//! is resolved before execution starts.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use solana_sdk::program_pack::Pack;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("Account {0} is not a token account")]
    NotATokenAccount(Pubkey),

    #[error("Insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Pubkey,
        needed: u64,
        available: u64,
    },

    #[error("Unsupported program: {0}")]
    UnsupportedProgram(Pubkey),

    #[error("Instruction rejected: {0}")]
    InstructionRejected(String),
}

/// Point-in-time copy of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

impl AccountSnapshot {
    pub fn new(owner: Pubkey, lamports: u64, data: Vec<u8>) -> Self {
        Self { owner, lamports, data }
    }

    /// Decode as an initialized SPL token account, if it is one
    pub fn token_account(&self) -> Option<spl_token::state::Account> {
        if self.owner != spl_token::id() {
            return None;
        }
        spl_token::state::Account::unpack(&self.data).ok()
    }
}

/// Runtime collaborator that owns account state
#[cfg_attr(test, mockall::automock)]
pub trait LedgerPort {
    /// Read an account, `None` if it does not exist
    fn account(&self, address: &Pubkey) -> Option<AccountSnapshot>;

    /// Token amount held by an SPL token account
    fn token_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    /// Execute one instruction against ledger state
    fn invoke(&mut self, instruction: &Instruction) -> Result<(), LedgerError>;
}
