//! Pump.fun Adapter
//!
//! Venue adapters for the pump.fun bonding-curve program. A buy spends
//! wrapped SOL for curve tokens, a sell does the reverse. Both take a
//! 13-slot window whose first entry is the program itself; the remaining
//! twelve are forwarded to the program in window order.
//!
//! Instruction data is the Anchor discriminator followed by two
//! little-endian `u64` arguments.

mod accounts;
mod buy;
mod curve;
mod sell;

pub use accounts::{
    associated_bonding_curve, bonding_curve_pda, creator_vault_pda, event_authority_pda, global_pda,
    load_curve, PumpSlot, PumpWindow, BUY_LAYOUT, BUY_ROLES, SELL_LAYOUT, SELL_ROLES,
};
pub use buy::{PumpfunBuyAdapter, BUY_DISCRIMINATOR};
pub use curve::{protocol_fee, BondingCurveState, BONDING_CURVE_DISCRIMINATOR, BONDING_CURVE_LEN};
pub use sell::{PumpfunSellAdapter, SELL_DISCRIMINATOR};

#[cfg(test)]
pub(crate) use curve::sample_curve;

use serde::{Deserialize, Serialize};
use solana_sdk::instruction::Instruction;

use crate::domain::account_binding::AccountSlot;
use crate::domain::error::RouterError;

/// Protocol fee pump.fun charges on the SOL leg
pub const DEFAULT_FEE_BPS: u16 = 100;

/// Two-argument payload shared by buy and sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpArgs {
    /// Tokens bought, or tokens sold
    pub amount: u64,
    /// Max lamports spent on a buy, min lamports received on a sell
    pub limit: u64,
}

impl PumpArgs {
    pub fn encode(&self, discriminator: &[u8; 8]) -> Result<Vec<u8>, RouterError> {
        let args = bincode::serialize(self)
            .map_err(|e| RouterError::InvalidAccountData(format!("encode pump args: {}", e)))?;
        let mut data = Vec::with_capacity(8 + args.len());
        data.extend_from_slice(discriminator);
        data.extend(args);
        Ok(data)
    }

    /// Split instruction data into discriminator and arguments
    pub fn decode(data: &[u8]) -> Option<([u8; 8], Self)> {
        if data.len() < 24 {
            return None;
        }
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&data[..8]);
        let args = bincode::deserialize(&data[8..24]).ok()?;
        Some((discriminator, args))
    }
}

/// Instruction invoking the program in slot 0 with the rest of the window
fn window_instruction(accounts: &[AccountSlot], data: Vec<u8>) -> Result<Instruction, RouterError> {
    let (program, rest) = accounts
        .split_first()
        .ok_or_else(|| RouterError::InvalidAccountData("empty pump.fun window".to_string()))?;
    Ok(Instruction {
        program_id: program.address,
        accounts: rest.iter().map(AccountSlot::to_account_meta).collect(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_wire_format() {
        let args = PumpArgs { amount: 354_000_000, limit: 10_000 };
        let data = args.encode(&BUY_DISCRIMINATOR).unwrap();

        assert_eq!(data.len(), 24);
        assert_eq!(&data[..8], &BUY_DISCRIMINATOR);
        assert_eq!(&data[8..16], &354_000_000u64.to_le_bytes());
        assert_eq!(&data[16..24], &10_000u64.to_le_bytes());
        assert_eq!(PumpArgs::decode(&data), Some((BUY_DISCRIMINATOR, args)));
    }

    #[test]
    fn test_decode_short_data() {
        assert_eq!(PumpArgs::decode(&SELL_DISCRIMINATOR), None);
    }
}
