//! Pump.fun sell: curve tokens in, wrapped SOL out

use solana_sdk::pubkey::Pubkey;

use crate::adapters::pump_fun::accounts::{verify_window, SELL_LAYOUT, SELL_ROLES};
use crate::adapters::pump_fun::{window_instruction, PumpArgs};
use crate::adapters::venue::{SlotSpec, VenueAdapter, VenueCall};
use crate::domain::account_binding::{AccountSlot, VenueEndpoints};
use crate::domain::error::RouterError;
use crate::domain::known_programs::native_mint;
use crate::domain::plan::Dex;
use crate::ports::ledger::LedgerPort;

/// Anchor discriminator of `sell`
pub const SELL_DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

#[derive(Debug, Clone)]
pub struct PumpfunSellAdapter {
    program_id: Pubkey,
    fee_bps: u16,
}

impl PumpfunSellAdapter {
    pub fn new(program_id: Pubkey, fee_bps: u16) -> Self {
        Self { program_id, fee_bps }
    }
}

impl VenueAdapter for PumpfunSellAdapter {
    fn dex(&self) -> Dex {
        Dex::PumpfunSell
    }

    fn account_layout(&self) -> &'static [SlotSpec] {
        &SELL_LAYOUT
    }

    fn verify<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        ledger: &L,
    ) -> Result<VenueEndpoints, RouterError> {
        let window = verify_window(self.dex(), &self.program_id, &SELL_ROLES, &SELL_LAYOUT, accounts, ledger)?;
        Ok(VenueEndpoints {
            source: window.source,
            destination: window.destination,
            input_mint: window.mint,
            output_mint: native_mint(),
        })
    }

    /// Sell all `amount_in` tokens, asking at least the quoted SOL back
    fn encode<L: LedgerPort + ?Sized>(
        &self,
        accounts: &[AccountSlot],
        amount_in: u64,
        ledger: &L,
    ) -> Result<VenueCall, RouterError> {
        let window = verify_window(self.dex(), &self.program_id, &SELL_ROLES, &SELL_LAYOUT, accounts, ledger)?;
        let lamports = window.curve.sell_quote(amount_in, self.fee_bps);

        tracing::debug!("pump.fun sell {}: {} tokens -> {} lamports", window.mint, amount_in, lamports);

        let args = PumpArgs {
            amount: amount_in,
            limit: lamports,
        };
        Ok(VenueCall {
            instruction: window_instruction(accounts, args.encode(&SELL_DISCRIMINATOR)?)?,
            source: window.source,
            destination: window.destination,
            quoted_out: lamports,
        })
    }
}
