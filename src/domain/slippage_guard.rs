//! Slippage Guard
//!
//! Compares the destination and source balances captured before the first
//! venue call with the ones read after the last. The realized output is the
//! destination delta over the whole settlement, never the sum of venue
//! quotes, and it must reach the plan's `min_return`.

use crate::domain::error::RouterError;
use crate::domain::plan::SwapPlan;

/// Guard settings
#[derive(Debug, Clone)]
pub struct SlippageGuardConfig {
    /// Reject settlements that debit more than `amount_in` from the source
    pub enforce_source_spend: bool,
}

impl Default for SlippageGuardConfig {
    fn default() -> Self {
        Self {
            enforce_source_spend: true,
        }
    }
}

/// Token balances at one point of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementSnapshot {
    pub destination_balance: u64,
    pub source_balance: u64,
}

/// What the settlement actually moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub realized_out: u64,
    pub source_spent: u64,
}

/// Pre/post settlement balance check
#[derive(Debug, Default)]
pub struct SlippageGuard {
    config: SlippageGuardConfig,
    pre_settlement: Option<SettlementSnapshot>,
}

impl SlippageGuard {
    pub fn new() -> Self {
        Self::with_config(SlippageGuardConfig::default())
    }

    pub fn with_config(config: SlippageGuardConfig) -> Self {
        Self {
            config,
            pre_settlement: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pre_settlement.is_some()
    }

    /// Capture balances right before the first venue is invoked
    pub fn capture_pre_settlement(&mut self, destination_balance: u64, source_balance: u64) {
        self.pre_settlement = Some(SettlementSnapshot {
            destination_balance,
            source_balance,
        });
        tracing::debug!(
            "Pre-settlement snapshot: destination {}, source {}",
            destination_balance,
            source_balance
        );
    }

    /// Check balances read right after the last venue returned
    ///
    /// Consumes the snapshot, so every settlement needs its own capture.
    pub fn validate_post_settlement(
        &mut self,
        plan: &SwapPlan,
        destination_balance: u64,
        source_balance: u64,
    ) -> Result<SettlementOutcome, RouterError> {
        let pre = self.pre_settlement.take().ok_or(RouterError::GuardNotArmed)?;

        let realized_out = destination_balance.saturating_sub(pre.destination_balance);
        let source_spent = pre.source_balance.saturating_sub(source_balance);

        tracing::info!(
            "Settlement delta: realized {} (min {}, expected {}), source spent {} of {}",
            realized_out,
            plan.min_return,
            plan.expect_amount_out,
            source_spent,
            plan.amount_in
        );

        if self.config.enforce_source_spend && source_spent > plan.amount_in {
            tracing::error!("Source overspent: {} > {}", source_spent, plan.amount_in);
            return Err(RouterError::SourceOverspent {
                spent: source_spent,
                amount_in: plan.amount_in,
            });
        }

        if realized_out < plan.min_return {
            tracing::error!("Slippage exceeded: realized {} < min {}", realized_out, plan.min_return);
            return Err(RouterError::SlippageExceeded {
                realized: realized_out,
                min_return: plan.min_return,
            });
        }

        if realized_out < plan.expect_amount_out {
            tracing::warn!(
                "Realized {} below expected {} ({} short)",
                realized_out,
                plan.expect_amount_out,
                plan.expect_amount_out - realized_out
            );
        }

        Ok(SettlementOutcome {
            realized_out,
            source_spent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::Dex;

    fn plan(amount_in: u64, expect: u64, min: u64) -> SwapPlan {
        SwapPlan::single_hop(Dex::PumpfunBuy, amount_in, expect, min)
    }

    #[test]
    fn test_passes_at_min_return() {
        let mut guard = SlippageGuard::new();
        guard.capture_pre_settlement(1_000, 50_000);

        let outcome = guard
            .validate_post_settlement(&plan(10_000, 600, 500), 1_500, 40_000)
            .unwrap();
        assert_eq!(outcome.realized_out, 500);
        assert_eq!(outcome.source_spent, 10_000);
        assert!(!guard.is_armed());
    }

    #[test]
    fn test_slippage_exceeded() {
        let mut guard = SlippageGuard::new();
        guard.capture_pre_settlement(0, 10_000);

        let err = guard
            .validate_post_settlement(&plan(10_000, 600, 500), 499, 0)
            .unwrap_err();
        assert_eq!(err, RouterError::SlippageExceeded { realized: 499, min_return: 500 });
    }

    #[test]
    fn test_expected_shortfall_is_advisory() {
        let mut guard = SlippageGuard::new();
        guard.capture_pre_settlement(0, 10_000);
        assert!(guard.validate_post_settlement(&plan(10_000, 1_000, 1), 2, 0).is_ok());
    }

    #[test]
    fn test_source_overspent() {
        let mut guard = SlippageGuard::new();
        guard.capture_pre_settlement(0, 20_000);

        let err = guard
            .validate_post_settlement(&plan(10_000, 10, 1), 10, 9_000)
            .unwrap_err();
        assert_eq!(err, RouterError::SourceOverspent { spent: 11_000, amount_in: 10_000 });
    }

    #[test]
    fn test_source_spend_check_can_be_disabled() {
        let mut guard = SlippageGuard::with_config(SlippageGuardConfig {
            enforce_source_spend: false,
        });
        guard.capture_pre_settlement(0, 20_000);
        assert!(guard.validate_post_settlement(&plan(10_000, 10, 1), 10, 0).is_ok());
    }

    #[test]
    fn test_validate_without_snapshot() {
        let mut guard = SlippageGuard::new();
        assert_eq!(
            guard.validate_post_settlement(&plan(1, 1, 1), 1, 0),
            Err(RouterError::GuardNotArmed)
        );
    }

    #[test]
    fn test_snapshot_consumed_on_failure() {
        let mut guard = SlippageGuard::new();
        guard.capture_pre_settlement(0, 100);
        assert!(guard.validate_post_settlement(&plan(100, 10, 10), 0, 0).is_err());
        assert!(!guard.is_armed());
    }
}
