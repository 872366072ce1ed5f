//! Pump.fun buy: wrapped SOL in, curve tokens out

use solana_sdk::pubkey::Pubkey;

use crate::adapters::pump_fun::accounts::{verify_window, BUY_LAYOUT, BUY_ROLES};
use crate::adapters::pump_fun::{window_instruction, PumpArgs};
use crate::adapters::venue::{SlotSpec, VenueAdapter, VenueCall};
use crate::domain::account_binding::{AccountSlot, VenueEndpoints};
use crate::domain::error::RouterError;
use crate::domain::known_programs::native_mint;
use crate::domain::plan::Dex;
use crate::ports::ledger::LedgerPort;

/// Anchor discriminator of `buy`
pub const BUY_DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];

#[derive(Debug, Clone)]
pub struct PumpfunBuyAdapter {
    program_id: Pubkey,
    fee_bps: u16,
}

impl PumpfunBuyAdapter {
    pub fn new(program_id: Pubkey, fee_bps: u16) -> Self {
        Self { program_id, fee_bps }
    }
}

impl VenueAdapter for PumpfunBuyAdapter {
    fn dex(&self) -> Dex {
        Dex::PumpfunBuy
    }

    fn account_layout(&self) -> &'static [SlotSpec] {
        &BUY_LAYOUT
    }

    fn verify<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        ledger: &L,
    ) -> Result<VenueEndpoints, RouterError> {
        let window = verify_window(self.dex(), &self.program_id, &BUY_ROLES, &BUY_LAYOUT, accounts, ledger)?;
        Ok(VenueEndpoints {
            source: window.source,
            destination: window.destination,
            input_mint: native_mint(),
            output_mint: window.mint,
        })
    }

    /// Buy as many tokens as `amount_in` lamports afford, capped at `amount_in`
    fn encode<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        amount_in: u64,
        ledger: &L,
    ) -> Result<VenueCall, RouterError> {
        let window = verify_window(self.dex(), &self.program_id, &BUY_ROLES, &BUY_LAYOUT, accounts, ledger)?;
        let tokens = window.curve.buy_quote(amount_in, self.fee_bps);

        tracing::debug!(
            "pump.fun buy {}: {} lamports -> {} tokens (spot {:.6})",
            window.mint,
            amount_in,
            tokens,
            window.curve.spot_price()
        );

        let args = PumpArgs {
            amount: tokens,
            limit: amount_in,
        };
        Ok(VenueCall {
            instruction: window_instruction(accounts, args.encode(&BUY_DISCRIMINATOR)?)?,
            source: window.source,
            destination: window.destination,
            quoted_out: tokens,
        })
    }
}
