//! Plan Validator
//!
//! Structural checks on a swap plan before anything touches the ledger.
//! Validation is pure: the same plan always gives the same verdict and
//! accepting a plan twice changes nothing.

use crate::config::loader::{Config, ConfigError};
use crate::domain::error::RouterError;
use crate::domain::plan::{Dex, SwapPlan};

/// Default cap on hops per route
pub const DEFAULT_MAX_HOPS_PER_ROUTE: usize = 3;

/// Weights of every hop must add up to this
pub const WEIGHT_TOTAL: u16 = 100;

/// Rejects malformed plans with `RouterError::MalformedPlan`
#[derive(Debug, Clone)]
pub struct PlanValidator {
    /// Longest hop sequence accepted per route
    pub max_hops_per_route: usize,
    /// Selectors with a registered adapter
    registered: Vec<Dex>,
}

impl Default for PlanValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HOPS_PER_ROUTE, Dex::ALL.to_vec())
    }
}

impl PlanValidator {
    pub fn new(max_hops_per_route: usize, registered: Vec<Dex>) -> Self {
        Self {
            max_hops_per_route,
            registered,
        }
    }

    /// Build from the `[router]` and `[venues]` sections
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.router.max_hops_per_route,
            config.venues.selectors()?,
        ))
    }

    pub fn is_registered(&self, dex: Dex) -> bool {
        self.registered.contains(&dex)
    }

    /// Validate plan structure, allocations and venue registration
    pub fn validate(&self, plan: &SwapPlan) -> Result<(), RouterError> {
        if plan.routes.is_empty() {
            return Err(malformed("plan has no routes"));
        }
        if plan.amounts.len() != plan.routes.len() {
            return Err(malformed(format!(
                "{} amounts for {} routes",
                plan.amounts.len(),
                plan.routes.len()
            )));
        }

        if plan.amount_in == 0 {
            return Err(malformed("amount_in must be > 0"));
        }
        if let Some(idx) = plan.amounts.iter().position(|amount| *amount == 0) {
            return Err(malformed(format!("route {} is allocated nothing", idx)));
        }

        let allocated = plan
            .amounts
            .iter()
            .try_fold(0u64, |acc, amount| acc.checked_add(*amount))
            .ok_or_else(|| malformed("route amounts overflow"))?;
        if allocated != plan.amount_in {
            return Err(malformed(format!(
                "route amounts sum to {}, amount_in is {}",
                allocated, plan.amount_in
            )));
        }

        for (route_idx, route) in plan.routes.iter().enumerate() {
            if route.hops.is_empty() {
                return Err(malformed(format!("route {} has no hops", route_idx)));
            }
            if route.hops.len() > self.max_hops_per_route {
                return Err(malformed(format!(
                    "route {} has {} hops, max {}",
                    route_idx,
                    route.hops.len(),
                    self.max_hops_per_route
                )));
            }

            for (hop_idx, hop) in route.hops.iter().enumerate() {
                if hop.venues.is_empty() {
                    return Err(malformed(format!("route {} hop {} has no venues", route_idx, hop_idx)));
                }
                if hop.weights.len() != hop.venues.len() {
                    return Err(malformed(format!(
                        "route {} hop {}: {} weights for {} venues",
                        route_idx,
                        hop_idx,
                        hop.weights.len(),
                        hop.venues.len()
                    )));
                }
                if let Some(weight) = hop.weights.iter().find(|w| **w > 100) {
                    return Err(malformed(format!(
                        "route {} hop {}: weight {} above 100",
                        route_idx, hop_idx, weight
                    )));
                }
                let total: u16 = hop.weights.iter().map(|w| *w as u16).sum();
                if total != WEIGHT_TOTAL {
                    return Err(malformed(format!(
                        "route {} hop {}: weights sum to {}",
                        route_idx, hop_idx, total
                    )));
                }
                if let Some(dex) = hop.venues.iter().find(|dex| !self.is_registered(**dex)) {
                    return Err(malformed(format!(
                        "route {} hop {}: venue {} is not registered",
                        route_idx, hop_idx, dex
                    )));
                }
            }
        }

        if plan.min_return > plan.expect_amount_out {
            return Err(malformed(format!(
                "min_return {} above expect_amount_out {}",
                plan.min_return, plan.expect_amount_out
            )));
        }

        tracing::debug!(
            "Plan accepted: {} in across {} routes, {} venue calls, tolerance {} bps",
            plan.amount_in,
            plan.routes.len(),
            plan.venue_count(),
            plan.tolerance_bps()
        );
        Ok(())
    }
}

fn malformed(reason: impl Into<String>) -> RouterError {
    RouterError::MalformedPlan(reason.into())
}
