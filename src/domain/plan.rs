//! Swap Plan
//!
//! Declarative description of one settlement: how much goes in, the output
//! floor, and the parallel routes (each a sequence of weighted venue hops)
//! the input is spread across. Plans are built by the caller for a single
//! invocation and dropped after settlement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Venue selector: names one adapter and its call variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dex {
    /// Pump.fun bonding curve, wrapped SOL -> token
    PumpfunBuy,
    /// Pump.fun bonding curve, token -> wrapped SOL
    PumpfunSell,
}

impl Dex {
    /// Every selector the router knows how to dispatch
    pub const ALL: [Dex; 2] = [Dex::PumpfunBuy, Dex::PumpfunSell];

    /// Config-file name of the selector
    pub fn name(&self) -> &'static str {
        match self {
            Dex::PumpfunBuy => "pumpfun_buy",
            Dex::PumpfunSell => "pumpfun_sell",
        }
    }

    /// Look up a selector by its config-file name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|dex| dex.name() == name)
    }
}

impl fmt::Display for Dex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stage of a route, resolved by one or more weighted venues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    #[serde(alias = "dexes")]
    pub venues: Vec<Dex>,
    /// Percentages parallel to `venues`
    pub weights: Vec<u8>,
}

impl Hop {
    /// Hop routed entirely through one venue
    pub fn single(venue: Dex) -> Self {
        Self {
            venues: vec![venue],
            weights: vec![100],
        }
    }

    /// Hop split across several venues
    pub fn split(venues: Vec<Dex>, weights: Vec<u8>) -> Self {
        Self { venues, weights }
    }

    pub fn is_split(&self) -> bool {
        self.venues.len() > 1
    }
}

/// Independent allocation of input, settled through sequential hops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    pub hops: Vec<Hop>,
}

impl Route {
    pub fn new(hops: Vec<Hop>) -> Self {
        Self { hops }
    }

    /// Total number of venue invocations this route expands to
    pub fn venue_count(&self) -> usize {
        self.hops.iter().map(|hop| hop.venues.len()).sum()
    }
}

/// Full settlement request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPlan {
    /// Input in base units of the source asset
    pub amount_in: u64,
    /// Advisory target output, never an abort condition
    pub expect_amount_out: u64,
    /// Hard floor on realized output
    pub min_return: u64,
    /// Per-route input allocation, parallel to `routes`
    pub amounts: Vec<u64>,
    pub routes: Vec<Route>,
}

impl SwapPlan {
    /// Plan sending everything through one single-venue hop
    pub fn single_hop(venue: Dex, amount_in: u64, expect_amount_out: u64, min_return: u64) -> Self {
        Self {
            amount_in,
            expect_amount_out,
            min_return,
            amounts: vec![amount_in],
            routes: vec![Route::new(vec![Hop::single(venue)])],
        }
    }

    /// Iterate routes with their allocated amount
    pub fn allocations(&self) -> impl Iterator<Item = (u64, &Route)> {
        self.amounts.iter().copied().zip(self.routes.iter())
    }

    /// Number of venue invocations across all routes
    pub fn venue_count(&self) -> usize {
        self.routes.iter().map(Route::venue_count).sum()
    }

    /// Advisory slippage tolerance between expected and minimum output, in bps
    pub fn tolerance_bps(&self) -> u64 {
        if self.expect_amount_out == 0 {
            return 0;
        }
        let gap = self.expect_amount_out.saturating_sub(self.min_return) as u128;
        (gap * 10_000 / self.expect_amount_out as u128) as u64
    }
}

/// Realized amounts for one venue invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopSettlement {
    pub route: usize,
    pub hop: usize,
    pub venue: Dex,
    pub amount_in: u64,
    pub amount_out: u64,
}

/// Final status of an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Committed,
    Aborted { code: u32, reason: String },
}

/// Outcome of one settlement invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub order_id: u64,
    /// Destination balance delta across the whole invocation
    pub realized_out: u64,
    pub hops: Vec<HopSettlement>,
    pub status: SettlementStatus,
}

impl SettlementResult {
    pub fn committed(order_id: u64, realized_out: u64, hops: Vec<HopSettlement>) -> Self {
        Self {
            order_id,
            realized_out,
            hops,
            status: SettlementStatus::Committed,
        }
    }

    /// Result of an invocation that failed; nothing it did is observable
    pub fn aborted(order_id: u64, code: u32, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            realized_out: 0,
            hops: Vec::new(),
            status: SettlementStatus::Aborted {
                code,
                reason: reason.into(),
            },
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.status, SettlementStatus::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_json() {
        let json = r#"{
            "amountIn": 10000,
            "expectAmountOut": 1,
            "minReturn": 1,
            "amounts": [10000],
            "routes": [[{ "dexes": ["pumpfunBuy"], "weights": [100] }]]
        }"#;

        let plan: SwapPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.amount_in, 10_000);
        assert_eq!(plan.routes.len(), 1);
        assert_eq!(plan.routes[0].hops[0].venues, vec![Dex::PumpfunBuy]);
        assert_eq!(plan.routes[0].hops[0].weights, vec![100]);
        assert_eq!(plan, SwapPlan::single_hop(Dex::PumpfunBuy, 10_000, 1, 1));
    }

    #[test]
    fn test_dex_names_roundtrip() {
        for dex in Dex::ALL {
            assert_eq!(Dex::from_name(dex.name()), Some(dex));
        }
        assert_eq!(Dex::from_name("raydium"), None);
    }

    #[test]
    fn test_venue_count() {
        let plan = SwapPlan {
            amount_in: 100,
            expect_amount_out: 10,
            min_return: 9,
            amounts: vec![60, 40],
            routes: vec![
                Route::new(vec![Hop::split(vec![Dex::PumpfunBuy, Dex::PumpfunBuy], vec![50, 50])]),
                Route::new(vec![Hop::single(Dex::PumpfunBuy), Hop::single(Dex::PumpfunSell)]),
            ],
        };
        assert_eq!(plan.venue_count(), 4);
        assert!(plan.routes[0].hops[0].is_split());
        assert_eq!(plan.allocations().map(|(a, _)| a).sum::<u64>(), 100);
    }

    #[test]
    fn test_tolerance_bps() {
        let plan = SwapPlan::single_hop(Dex::PumpfunBuy, 100, 1_000, 980);
        assert_eq!(plan.tolerance_bps(), 200);

        let zero = SwapPlan::single_hop(Dex::PumpfunBuy, 100, 0, 0);
        assert_eq!(zero.tolerance_bps(), 0);
    }

    #[test]
    fn test_aborted_result() {
        let result = SettlementResult::aborted(7, 2006, "seeds");
        assert!(!result.is_committed());
        assert_eq!(result.realized_out, 0);
        assert_eq!(result.order_id, 7);
    }
}
