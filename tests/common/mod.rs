//! Shared fixtures: a freshly launched pump.fun token on a simulated ledger

#![allow(dead_code)]

use route_settler::adapters::pump_fun::{BondingCurveState, PumpWindow};
use route_settler::adapters::sim::SimulatedLedger;
use route_settler::application::SwapAccounts;
use route_settler::config::{init_logging, LoggingSection};
use route_settler::domain::native_mint;
use route_settler::ports::LedgerPort;
use solana_sdk::pubkey::Pubkey;

/// Lamports of wrapped SOL the payer starts with
pub const WSOL_FUNDING: u64 = 1_000_000;

pub fn launch_curve(creator: Pubkey) -> BondingCurveState {
    BondingCurveState {
        virtual_token_reserves: 1_073_000_000_000_000,
        virtual_sol_reserves: 30_000_000_000,
        real_token_reserves: 793_100_000_000_000,
        real_sol_reserves: 0,
        token_total_supply: 1_000_000_000_000_000,
        complete: false,
        creator,
    }
}

pub struct Market {
    pub ledger: SimulatedLedger,
    pub payer: Pubkey,
    pub mint: Pubkey,
    pub creator: Pubkey,
    pub fee_recipient: Pubkey,
    /// Payer's wrapped SOL account
    pub wsol: Pubkey,
    /// Payer's account for the launched token
    pub tokens: Pubkey,
}

impl Market {
    pub fn launch() -> Self {
        let _ = init_logging(&LoggingSection::default());

        let mut ledger = SimulatedLedger::new();
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let creator = Pubkey::new_unique();
        let wsol = Pubkey::new_unique();
        let tokens = Pubkey::new_unique();

        ledger.add_mint(native_mint(), 9);
        ledger.add_mint(mint, 6);
        ledger.add_bonding_curve(mint, &launch_curve(creator));
        ledger.add_token_account(wsol, native_mint(), payer, WSOL_FUNDING);
        ledger.add_token_account(tokens, mint, payer, 0);

        Self {
            ledger,
            payer,
            mint,
            creator,
            fee_recipient: Pubkey::new_unique(),
            wsol,
            tokens,
        }
    }

    /// Window moving `source` into `destination` on behalf of `payer`
    pub fn window(&self, payer: Pubkey, source: Pubkey, destination: Pubkey) -> PumpWindow {
        PumpWindow {
            program_id: self.ledger.pump_program(),
            payer,
            source,
            destination,
            fee_recipient: self.fee_recipient,
            mint: self.mint,
            creator: self.creator,
        }
    }

    pub fn buy_window(&self) -> PumpWindow {
        self.window(self.payer, self.wsol, self.tokens)
    }

    /// Direct-path accounts for WSOL -> token
    pub fn buy_accounts(&self) -> SwapAccounts {
        SwapAccounts {
            payer: self.payer,
            source_token_account: self.wsol,
            destination_token_account: self.tokens,
            source_mint: native_mint(),
            destination_mint: self.mint,
        }
    }

    /// Tokens the curve currently gives for `sol_in`
    pub fn quote(&self, sol_in: u64) -> u64 {
        self.curve().buy_quote(sol_in, self.ledger.pump_fee_bps())
    }

    pub fn curve(&self) -> BondingCurveState {
        self.ledger
            .bonding_curve(&self.mint)
            .expect("curve seeded at launch")
    }

    pub fn balance(&self, account: &Pubkey) -> u64 {
        self.ledger.token_balance(account).expect("token account")
    }
}
