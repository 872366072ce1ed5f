//! Bonding Curve State
//!
//! On-chain state of a pump.fun bonding curve and the constant-product
//! pricing over its virtual reserves. The account is an 8-byte Anchor
//! discriminator followed by the fields below, little-endian.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::domain::error::RouterError;

/// Anchor account discriminator of `BondingCurve`
pub const BONDING_CURVE_DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

/// Bytes of the fields after the discriminator
pub const BONDING_CURVE_LEN: usize = 8 * 5 + 1 + 32;

const BPS_DENOMINATOR: u128 = 10_000;

/// Bonding curve state for a pump.fun token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondingCurveState {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    /// Tokens still held by the curve
    pub real_token_reserves: u64,
    /// Lamports actually paid into the curve
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    /// Whether the bonding curve has completed (token graduated)
    pub complete: bool,
    /// Receives the creator fee, seeds the creator vault
    pub creator: Pubkey,
}

impl BondingCurveState {
    /// Decode from raw account data
    pub fn decode(data: &[u8]) -> Result<Self, RouterError> {
        if data.len() < 8 + BONDING_CURVE_LEN {
            return Err(RouterError::InvalidAccountData(format!(
                "bonding curve holds {} bytes, need {}",
                data.len(),
                8 + BONDING_CURVE_LEN
            )));
        }
        if data[..8] != BONDING_CURVE_DISCRIMINATOR {
            return Err(RouterError::InvalidAccountData(
                "bonding curve discriminator mismatch".to_string(),
            ));
        }
        bincode::deserialize(&data[8..])
            .map_err(|e| RouterError::InvalidAccountData(format!("bonding curve: {}", e)))
    }

    /// Encode as account data
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(8 + BONDING_CURVE_LEN);
        data.extend_from_slice(&BONDING_CURVE_DISCRIMINATOR);
        // Plain integers, a bool and a fixed array never fail to serialize
        data.extend(bincode::serialize(self).unwrap_or_default());
        data
    }

    /// Tokens out for `sol_in` lamports, protocol fee taken off the input
    pub fn buy_quote(&self, sol_in: u64, fee_bps: u16) -> u64 {
        let net = sol_in as u128 * BPS_DENOMINATOR / (BPS_DENOMINATOR + fee_bps as u128);
        let denominator = self.virtual_sol_reserves as u128 + net;
        if denominator == 0 {
            return 0;
        }
        let tokens = self.virtual_token_reserves as u128 * net / denominator;
        (tokens as u64).min(self.real_token_reserves)
    }

    /// Lamports the curve charges for exactly `tokens`, before fee
    pub fn buy_cost(&self, tokens: u64) -> Option<u64> {
        let remaining = self.virtual_token_reserves.checked_sub(tokens)?;
        if remaining == 0 {
            return None;
        }
        let cost = self.virtual_sol_reserves as u128 * tokens as u128 / remaining as u128;
        u64::try_from(cost).ok()
    }

    /// Lamports the curve pays for `tokens`, before fee
    pub fn sell_proceeds(&self, tokens: u64) -> u64 {
        let denominator = self.virtual_token_reserves as u128 + tokens as u128;
        if denominator == 0 {
            return 0;
        }
        (self.virtual_sol_reserves as u128 * tokens as u128 / denominator) as u64
    }

    /// Lamports out for `tokens`, net of the protocol fee
    pub fn sell_quote(&self, tokens: u64, fee_bps: u16) -> u64 {
        let gross = self.sell_proceeds(tokens).min(self.real_sol_reserves);
        gross.saturating_sub(protocol_fee(gross, fee_bps))
    }

    /// Move reserves for a buy of `tokens` costing `sol` lamports
    pub fn apply_buy(&mut self, tokens: u64, sol: u64) -> Option<()> {
        let next = Self {
            virtual_token_reserves: self.virtual_token_reserves.checked_sub(tokens)?,
            real_token_reserves: self.real_token_reserves.checked_sub(tokens)?,
            virtual_sol_reserves: self.virtual_sol_reserves.checked_add(sol)?,
            real_sol_reserves: self.real_sol_reserves.checked_add(sol)?,
            ..self.clone()
        };
        *self = next;
        Some(())
    }

    /// Move reserves for a sell of `tokens` paying out `sol` lamports
    pub fn apply_sell(&mut self, tokens: u64, sol: u64) -> Option<()> {
        let next = Self {
            virtual_token_reserves: self.virtual_token_reserves.checked_add(tokens)?,
            real_token_reserves: self.real_token_reserves.checked_add(tokens)?,
            virtual_sol_reserves: self.virtual_sol_reserves.checked_sub(sol)?,
            real_sol_reserves: self.real_sol_reserves.checked_sub(sol)?,
            ..self.clone()
        };
        *self = next;
        Some(())
    }

    /// Calculate price in lamports per token base unit
    pub fn spot_price(&self) -> f64 {
        if self.virtual_token_reserves == 0 {
            return 0.0;
        }
        self.virtual_sol_reserves as f64 / self.virtual_token_reserves as f64
    }
}

/// Fee in lamports for `amount` at `fee_bps`, rounded down
pub fn protocol_fee(amount: u64, fee_bps: u16) -> u64 {
    (amount as u128 * fee_bps as u128 / BPS_DENOMINATOR) as u64
}

#[cfg(test)]
pub(crate) fn sample_curve(creator: Pubkey) -> BondingCurveState {
    // Launch parameters of a fresh pump.fun curve
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_layout() {
        let creator = Pubkey::new_unique();
        let curve = sample_curve(creator);
        let data = curve.encode();

        assert_eq!(data.len(), 8 + BONDING_CURVE_LEN);
        assert_eq!(&data[..8], &BONDING_CURVE_DISCRIMINATOR);
        assert_eq!(&data[8..16], &1_073_000_000_000_000u64.to_le_bytes());
        assert_eq!(&data[49..81], creator.as_ref());
        assert_eq!(BondingCurveState::decode(&data).unwrap(), curve);
    }

    #[test]
    fn test_decode_tolerates_trailing_bytes() {
        let curve = sample_curve(Pubkey::new_unique());
        let mut data = curve.encode();
        data.extend_from_slice(&[0u8; 70]);
        assert_eq!(BondingCurveState::decode(&data).unwrap(), curve);
    }

    #[test]
    fn test_decode_rejects_short_or_foreign_data() {
        let data = sample_curve(Pubkey::new_unique()).encode();
        assert!(matches!(
            BondingCurveState::decode(&data[..40]),
            Err(RouterError::InvalidAccountData(_))
        ));

        let mut wrong = data.clone();
        wrong[0] ^= 0xff;
        assert!(matches!(BondingCurveState::decode(&wrong), Err(RouterError::InvalidAccountData(_))));
    }

    #[test]
    fn test_buy_quote_is_affordable() {
        let curve = sample_curve(Pubkey::new_unique());
        for sol_in in [1u64, 10_000, 1_000_000_000, 50_000_000_000] {
            let tokens = curve.buy_quote(sol_in, 100);
            let cost = curve.buy_cost(tokens).unwrap();
            assert!(cost + protocol_fee(cost, 100) <= sol_in, "sol_in {}", sol_in);
        }
    }

    #[test]
    fn test_buy_quote_small_amount() {
        let curve = sample_curve(Pubkey::new_unique());
        // 10_000 lamports, 1% fee: net 9_900 -> ~354k base units at launch price
        let tokens = curve.buy_quote(10_000, 100);
        assert_eq!(tokens, (1_073_000_000_000_000u128 * 9_900 / (30_000_000_000u128 + 9_900)) as u64);
        assert!(tokens > 0);
    }

    #[test]
    fn test_buy_quote_capped_by_real_reserves() {
        let mut curve = sample_curve(Pubkey::new_unique());
        curve.real_token_reserves = 1_000;
        assert_eq!(curve.buy_quote(1_000_000_000, 100), 1_000);
    }

    #[test]
    fn test_sell_quote_net_of_fee() {
        let mut curve = sample_curve(Pubkey::new_unique());
        curve.real_sol_reserves = 1_000_000_000;
        let gross = curve.sell_proceeds(1_000_000_000);
        assert_eq!(curve.sell_quote(1_000_000_000, 100), gross - gross / 100);
    }

    #[test]
    fn test_sell_quote_fee_above_proceeds_is_zero() {
        let mut curve = sample_curve(Pubkey::new_unique());
        curve.real_sol_reserves = 1_000_000_000;
        assert_eq!(curve.sell_quote(1_000_000_000, 20_000), 0);
    }

    #[test]
    fn test_sell_quote_limited_by_real_sol() {
        let curve = sample_curve(Pubkey::new_unique());
        assert_eq!(curve.sell_quote(1_000_000_000, 100), 0);
    }

    #[test]
    fn test_apply_buy_then_sell() {
        let mut curve = sample_curve(Pubkey::new_unique());
        curve.apply_buy(1_000, 50).unwrap();
        assert_eq!(curve.real_sol_reserves, 50);
        curve.apply_sell(1_000, 50).unwrap();
        assert_eq!(curve, sample_curve(curve.creator));
        assert!(curve.apply_sell(1, 1).is_none());
        assert_eq!(curve.virtual_token_reserves, 1_073_000_000_000_000);
    }

    #[test]
    fn test_buy_cost_rejects_draining_curve() {
        let curve = sample_curve(Pubkey::new_unique());
        assert!(curve.buy_cost(curve.virtual_token_reserves).is_none());
    }
}
