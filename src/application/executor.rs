//! Route Executor
//!
//! Runs a validated, pre-verified plan against the ledger. Routes execute in
//! plan order with their allocation; each hop splits its running amount by
//! weight and hands every share to its venue. What a venue produced is read
//! off its destination account, never taken from the quote.

use crate::adapters::venue::{VenueAdapter, VenueRegistry};
use crate::domain::account_binding::{AccountBinding, VenueSlot};
use crate::domain::error::RouterError;
use crate::domain::plan::{HopSettlement, SwapPlan};
use crate::domain::split::split_by_weights;
use crate::ports::ledger::LedgerPort;

/// Dispatches venue invocations for one settlement
pub struct RouteExecutor<'a> {
    registry: &'a VenueRegistry,
}

impl<'a> RouteExecutor<'a> {
    pub fn new(registry: &'a VenueRegistry) -> Self {
        Self { registry }
    }

    /// Execute every route of `plan`
    ///
    /// `venues` must be the windows `AccountBinding::plan_slices` produced for
    /// this plan. Returns one settlement per venue in execution order. The
    /// first failing venue aborts the whole run; nothing is undone here.
    pub fn execute<L: LedgerPort + ?Sized>(
        &self,
        ledger: &mut L,
        plan: &SwapPlan,
        binding: &AccountBinding,
        venues: &[VenueSlot],
    ) -> Result<Vec<HopSettlement>, RouterError> {
        let mut windows = venues.iter();
        let mut settlements = Vec::with_capacity(venues.len());

        for (route_idx, (allocation, route)) in plan.allocations().enumerate() {
            let mut running = allocation;

            for (hop_idx, hop) in route.hops.iter().enumerate() {
                let shares = split_by_weights(running, &hop.weights)?;
                let mut hop_out: u64 = 0;

                for (dex, share) in hop.venues.iter().copied().zip(shares) {
                    let window = windows
                        .next()
                        .filter(|w| w.route == route_idx && w.hop == hop_idx && w.dex == dex)
                        .ok_or_else(|| {
                            RouterError::InvalidAccountData(format!(
                                "no account window for route {} hop {} {}",
                                route_idx, hop_idx, dex
                            ))
                        })?;

                    if share == 0 {
                        tracing::debug!("Route {} hop {} {}: zero share, skipped", route_idx, hop_idx, dex);
                        settlements.push(HopSettlement {
                            route: route_idx,
                            hop: hop_idx,
                            venue: dex,
                            amount_in: 0,
                            amount_out: 0,
                        });
                        continue;
                    }

                    let venue = self.registry.get(dex)?;
                    let call = venue.encode(binding.slice(window.slice), share, &*ledger)?;

                    let before = ledger.token_balance(&call.destination)?;
                    ledger.invoke(&call.instruction)?;
                    let after = ledger.token_balance(&call.destination)?;
                    let produced = after.checked_sub(before).ok_or(RouterError::ArithmeticOverflow)?;

                    tracing::info!(
                        "Route {} hop {} {}: {} in -> {} out (quoted {})",
                        route_idx,
                        hop_idx,
                        dex,
                        share,
                        produced,
                        call.quoted_out
                    );

                    hop_out = hop_out.checked_add(produced).ok_or(RouterError::ArithmeticOverflow)?;
                    settlements.push(HopSettlement {
                        route: route_idx,
                        hop: hop_idx,
                        venue: dex,
                        amount_in: share,
                        amount_out: produced,
                    });
                }

                running = hop_out;
            }
        }

        Ok(settlements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::pump_fun::{bonding_curve_pda, sample_curve, PumpWindow};
    use crate::domain::account_binding::EntryPath;
    use crate::domain::known_programs::pumpfun_program_id;
    use crate::domain::plan::{Dex, Hop, Route};
    use crate::ports::ledger::{AccountSnapshot, LedgerError, MockLedgerPort};
    use solana_sdk::pubkey::Pubkey;

    fn window() -> PumpWindow {
        PumpWindow {
            program_id: pumpfun_program_id(),
            payer: Pubkey::new_unique(),
            source: Pubkey::new_unique(),
            destination: Pubkey::new_unique(),
            fee_recipient: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
        }
    }

    fn ledger_with_curve(window: &PumpWindow) -> MockLedgerPort {
        let curve_address = bonding_curve_pda(&window.program_id, &window.mint);
        let data = sample_curve(window.creator).encode();
        let program_id = window.program_id;

        let mut ledger = MockLedgerPort::new();
        ledger.expect_account().returning(move |address| {
            (*address == curve_address).then(|| AccountSnapshot::new(program_id, 1, data.clone()))
        });
        ledger
    }

    fn binding_for(window: &PumpWindow, venues: usize) -> AccountBinding {
        let metas: Vec<_> = (0..venues).flat_map(|_| window.buy_metas()).collect();
        AccountBinding::from_metas(&metas)
    }

    #[test]
    fn test_single_hop_output_is_destination_delta() {
        let window = window();
        let mut ledger = ledger_with_curve(&window);
        let mut balances = [1_000u64, 1_250].into_iter();
        ledger
            .expect_token_balance()
            .times(2)
            .returning(move |_| Ok(balances.next().unwrap_or(0)));
        ledger.expect_invoke().times(1).returning(|_| Ok(()));

        let registry = VenueRegistry::default();
        let plan = SwapPlan::single_hop(Dex::PumpfunBuy, 10_000, 250, 250);
        let binding = binding_for(&window, 1);
        let venues = binding
            .plan_slices(&plan, EntryPath::Direct, |dex| registry.arity(dex))
            .unwrap();

        let hops = RouteExecutor::new(&registry)
            .execute(&mut ledger, &plan, &binding, &venues)
            .unwrap();

        assert_eq!(hops.len(), 1);
        assert_eq!(hops[0].amount_in, 10_000);
        assert_eq!(hops[0].amount_out, 250);
    }

    #[test]
    fn test_zero_share_is_not_invoked() {
        let window = window();
        let mut ledger = ledger_with_curve(&window);
        ledger.expect_token_balance().times(2).returning(|_| Ok(0));
        ledger.expect_invoke().times(1).returning(|_| Ok(()));

        let registry = VenueRegistry::default();
        let plan = SwapPlan {
            amount_in: 1_000,
            expect_amount_out: 0,
            min_return: 0,
            amounts: vec![1_000],
            routes: vec![Route::new(vec![Hop::split(
                vec![Dex::PumpfunBuy, Dex::PumpfunBuy],
                vec![0, 100],
            )])],
        };
        let binding = binding_for(&window, 2);
        let venues = binding
            .plan_slices(&plan, EntryPath::Direct, |dex| registry.arity(dex))
            .unwrap();

        let hops = RouteExecutor::new(&registry)
            .execute(&mut ledger, &plan, &binding, &venues)
            .unwrap();

        assert_eq!(hops[0].amount_in, 0);
        assert_eq!(hops[1].amount_in, 1_000);
    }

    #[test]
    fn test_split_shares_follow_remainder_policy() {
        let window = window();
        let mut ledger = ledger_with_curve(&window);
        ledger.expect_token_balance().returning(|_| Ok(0));
        ledger.expect_invoke().times(2).returning(|_| Ok(()));

        let registry = VenueRegistry::default();
        let plan = SwapPlan {
            amount_in: 1_001,
            expect_amount_out: 0,
            min_return: 0,
            amounts: vec![1_001],
            routes: vec![Route::new(vec![Hop::split(
                vec![Dex::PumpfunBuy, Dex::PumpfunBuy],
                vec![50, 50],
            )])],
        };
        let binding = binding_for(&window, 2);
        let venues = binding
            .plan_slices(&plan, EntryPath::Direct, |dex| registry.arity(dex))
            .unwrap();

        let hops = RouteExecutor::new(&registry)
            .execute(&mut ledger, &plan, &binding, &venues)
            .unwrap();
        assert_eq!(hops.iter().map(|h| h.amount_in).collect::<Vec<_>>(), vec![500, 501]);
    }

    #[test]
    fn test_ledger_failure_aborts() {
        let window = window();
        let mut ledger = ledger_with_curve(&window);
        ledger.expect_token_balance().returning(|_| Ok(0));
        ledger
            .expect_invoke()
            .times(1)
            .returning(|_| Err(LedgerError::InstructionRejected("TooMuchSolRequired".to_string())));

        let registry = VenueRegistry::default();
        let plan = SwapPlan {
            amount_in: 2_000,
            expect_amount_out: 0,
            min_return: 0,
            amounts: vec![1_000, 1_000],
            routes: vec![
                Route::new(vec![Hop::single(Dex::PumpfunBuy)]),
                Route::new(vec![Hop::single(Dex::PumpfunBuy)]),
            ],
        };
        let binding = binding_for(&window, 2);
        let venues = binding
            .plan_slices(&plan, EntryPath::Direct, |dex| registry.arity(dex))
            .unwrap();

        let err = RouteExecutor::new(&registry)
            .execute(&mut ledger, &plan, &binding, &venues)
            .unwrap_err();
        assert!(matches!(err, RouterError::Ledger(LedgerError::InstructionRejected(_))));
    }

    #[test]
    fn test_mismatched_windows_rejected() {
        let window = window();
        let mut ledger = ledger_with_curve(&window);
        let registry = VenueRegistry::default();
        let plan = SwapPlan::single_hop(Dex::PumpfunBuy, 100, 1, 1);
        let binding = binding_for(&window, 1);

        let err = RouteExecutor::new(&registry)
            .execute(&mut ledger, &plan, &binding, &[])
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidAccountData(_)));
    }
}
