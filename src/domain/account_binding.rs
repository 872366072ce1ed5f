//! Account Binding
//!
//! The flat, positionally-ordered account list attached to an invocation,
//! and the resolver that hands each venue of the plan its own sub-range.
//! Order is a contract: the resolver never reorders, renames or copies
//! entries, it only hands out `(offset, len)` windows over the one list.

use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

use crate::domain::error::RouterError;
use crate::domain::plan::{Dex, SwapPlan};

/// One entry of the binding: address plus the caller's access assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSlot {
    pub address: Pubkey,
    pub is_writable: bool,
    pub is_signer: bool,
}

impl AccountSlot {
    pub fn new(address: Pubkey, is_writable: bool, is_signer: bool) -> Self {
        Self {
            address,
            is_writable,
            is_signer,
        }
    }

    pub fn readonly(address: Pubkey) -> Self {
        Self::new(address, false, false)
    }

    pub fn writable(address: Pubkey) -> Self {
        Self::new(address, true, false)
    }

    pub fn signer(address: Pubkey) -> Self {
        Self::new(address, true, true)
    }

    pub fn to_account_meta(&self) -> AccountMeta {
        if self.is_writable {
            AccountMeta::new(self.address, self.is_signer)
        } else {
            AccountMeta::new_readonly(self.address, self.is_signer)
        }
    }
}

impl From<&AccountMeta> for AccountSlot {
    fn from(meta: &AccountMeta) -> Self {
        Self::new(meta.pubkey, meta.is_writable, meta.is_signer)
    }
}

impl From<AccountMeta> for AccountSlot {
    fn from(meta: AccountMeta) -> Self {
        Self::from(&meta)
    }
}

/// Window over the flat binding owned by one venue invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSlice {
    pub offset: usize,
    pub len: usize,
}

impl BindingSlice {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Which entry point the binding was supplied through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPath {
    Direct,
    Proxied,
}

/// A venue invocation of the plan together with its binding window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueSlot {
    pub route: usize,
    pub hop: usize,
    /// Position of the venue inside its hop
    pub position: usize,
    pub dex: Dex,
    pub slice: BindingSlice,
}

/// Token accounts and mints a venue reads from and writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueEndpoints {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
}

/// Where a route must start and end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEndpoints {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub source_mint: Pubkey,
    pub destination_mint: Pubkey,
}

/// Flat ordered account list supplied with an invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBinding {
    slots: Vec<AccountSlot>,
}

impl AccountBinding {
    pub fn new(slots: Vec<AccountSlot>) -> Self {
        Self { slots }
    }

    pub fn from_metas(metas: &[AccountMeta]) -> Self {
        Self::new(metas.iter().map(AccountSlot::from).collect())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[AccountSlot] {
        &self.slots
    }

    /// Borrow the window a venue was assigned
    pub fn slice(&self, window: BindingSlice) -> &[AccountSlot] {
        let end = window.end().min(self.slots.len());
        let start = window.offset.min(end);
        &self.slots[start..end]
    }

    /// Assign every venue of the plan its window, in execution order
    ///
    /// Venues consume the list route by route, hop by hop, venue by venue.
    /// Each takes exactly `arity(dex)` entries. A list that runs short, or
    /// that has entries left after the last venue, is rejected before any
    /// venue sees it.
    pub fn plan_slices<F>(
        &self,
        plan: &SwapPlan,
        path: EntryPath,
        arity: F,
    ) -> Result<Vec<VenueSlot>, RouterError>
    where
        F: Fn(Dex) -> usize,
    {
        let mut cursor = 0usize;
        let mut venues = Vec::with_capacity(plan.venue_count());

        for (route_idx, route) in plan.routes.iter().enumerate() {
            for (hop_idx, hop) in route.hops.iter().enumerate() {
                for (position, dex) in hop.venues.iter().copied().enumerate() {
                    let expected = arity(dex);
                    let available = self.slots.len().saturating_sub(cursor);

                    if available < expected {
                        return Err(match path {
                            EntryPath::Direct => RouterError::AccountLayoutMismatch {
                                venue: dex,
                                expected,
                                actual: available,
                            },
                            EntryPath::Proxied => RouterError::InvalidAccountData(format!(
                                "route {} hop {} {}: needs {} accounts, {} remain",
                                route_idx, hop_idx, dex, expected, available
                            )),
                        });
                    }

                    venues.push(VenueSlot {
                        route: route_idx,
                        hop: hop_idx,
                        position,
                        dex,
                        slice: BindingSlice {
                            offset: cursor,
                            len: expected,
                        },
                    });
                    cursor += expected;
                }
            }
        }

        if cursor != self.slots.len() {
            return Err(RouterError::InvalidAccountData(format!(
                "{} trailing accounts not consumed by any venue",
                self.slots.len() - cursor
            )));
        }

        tracing::debug!("Resolved {} venue windows over {} accounts", venues.len(), cursor);
        Ok(venues)
    }
}

/// Check that the venues of each route chain into one another
///
/// Every venue of a hop must read the previous hop's output account (or the
/// route source for the first hop) and all of them must write the same
/// account. The last hop must land in the route destination.
pub fn check_route_continuity(
    resolved: &[(VenueSlot, VenueEndpoints)],
    endpoints: &RouteEndpoints,
) -> Result<(), RouterError> {
    let mut idx = 0;
    while idx < resolved.len() {
        let route = resolved[idx].0.route;
        let mut expected_source = endpoints.source;
        let mut expected_mint = endpoints.source_mint;

        while idx < resolved.len() && resolved[idx].0.route == route {
            let hop = resolved[idx].0.hop;
            let hop_output = resolved[idx].1;

            while idx < resolved.len() && resolved[idx].0.route == route && resolved[idx].0.hop == hop {
                let (slot, venue) = &resolved[idx];
                if venue.source != expected_source {
                    return Err(RouterError::InvalidAccountData(format!(
                        "route {} hop {} {}: reads {} but input is held in {}",
                        route, hop, slot.dex, venue.source, expected_source
                    )));
                }
                if venue.input_mint != expected_mint {
                    return Err(RouterError::InvalidAccountData(format!(
                        "route {} hop {} {}: consumes mint {} but input mint is {}",
                        route, hop, slot.dex, venue.input_mint, expected_mint
                    )));
                }
                if venue.destination != hop_output.destination || venue.output_mint != hop_output.output_mint {
                    return Err(RouterError::InvalidAccountData(format!(
                        "route {} hop {}: venues disagree on output account",
                        route, hop
                    )));
                }
                idx += 1;
            }

            expected_source = hop_output.destination;
            expected_mint = hop_output.output_mint;
        }

        if expected_source != endpoints.destination {
            return Err(RouterError::InvalidAccountData(format!(
                "route {} ends in {} instead of destination {}",
                route, expected_source, endpoints.destination
            )));
        }
        if expected_mint != endpoints.destination_mint {
            return Err(RouterError::InvalidAccountData(format!(
                "route {} produces mint {} instead of {}",
                route, expected_mint, endpoints.destination_mint
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{Hop, Route};

    fn binding_of(len: usize) -> AccountBinding {
        AccountBinding::new((0..len).map(|_| AccountSlot::writable(Pubkey::new_unique())).collect())
    }

    fn two_route_plan() -> SwapPlan {
        SwapPlan {
            amount_in: 100,
            expect_amount_out: 10,
            min_return: 1,
            amounts: vec![50, 50],
            routes: vec![
                Route::new(vec![Hop::split(vec![Dex::PumpfunBuy, Dex::PumpfunBuy], vec![60, 40])]),
                Route::new(vec![Hop::single(Dex::PumpfunBuy), Hop::single(Dex::PumpfunSell)]),
            ],
        }
    }

    #[test]
    fn test_slices_are_positional_and_contiguous() {
        let binding = binding_of(4 * 3);
        let venues = binding
            .plan_slices(&two_route_plan(), EntryPath::Direct, |_| 3)
            .unwrap();

        assert_eq!(venues.len(), 4);
        for (i, venue) in venues.iter().enumerate() {
            assert_eq!(venue.slice, BindingSlice { offset: i * 3, len: 3 });
            assert_eq!(binding.slice(venue.slice), &binding.slots()[i * 3..i * 3 + 3]);
        }
        assert_eq!((venues[1].route, venues[1].hop, venues[1].position), (0, 0, 1));
        assert_eq!((venues[3].route, venues[3].hop, venues[3].dex), (1, 1, Dex::PumpfunSell));
    }

    #[test]
    fn test_short_binding_direct_path() {
        let binding = binding_of(12);
        let plan = SwapPlan::single_hop(Dex::PumpfunBuy, 10_000, 1, 1);
        let err = binding.plan_slices(&plan, EntryPath::Direct, |_| 13).unwrap_err();

        assert_eq!(
            err,
            RouterError::AccountLayoutMismatch {
                venue: Dex::PumpfunBuy,
                expected: 13,
                actual: 12
            }
        );
    }

    #[test]
    fn test_short_binding_proxied_path() {
        let binding = binding_of(12);
        let plan = SwapPlan::single_hop(Dex::PumpfunBuy, 10_000, 1, 1);
        let err = binding.plan_slices(&plan, EntryPath::Proxied, |_| 13).unwrap_err();
        assert!(matches!(err, RouterError::InvalidAccountData(_)));
    }

    #[test]
    fn test_trailing_accounts_rejected() {
        let binding = binding_of(14);
        let plan = SwapPlan::single_hop(Dex::PumpfunBuy, 10_000, 1, 1);
        let err = binding.plan_slices(&plan, EntryPath::Direct, |_| 13).unwrap_err();
        assert!(matches!(err, RouterError::InvalidAccountData(msg) if msg.contains("1 trailing")));
    }

    #[test]
    fn test_slot_from_account_meta() {
        let key = Pubkey::new_unique();
        let slot = AccountSlot::from(AccountMeta::new_readonly(key, false));
        assert_eq!(slot, AccountSlot::readonly(key));
        assert_eq!(slot.to_account_meta(), AccountMeta::new_readonly(key, false));

        let payer = AccountSlot::signer(key);
        assert_eq!(payer.to_account_meta(), AccountMeta::new(key, true));
    }

    fn venue(route: usize, hop: usize, dex: Dex) -> VenueSlot {
        VenueSlot {
            route,
            hop,
            position: 0,
            dex,
            slice: BindingSlice { offset: 0, len: 0 },
        }
    }

    #[test]
    fn test_continuity_two_hop_route() {
        let wsol = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let (src, mid, dst) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let endpoints = RouteEndpoints {
            source: src,
            destination: dst,
            source_mint: wsol,
            destination_mint: wsol,
        };

        let resolved = vec![
            (
                venue(0, 0, Dex::PumpfunBuy),
                VenueEndpoints { source: src, destination: mid, input_mint: wsol, output_mint: token },
            ),
            (
                venue(0, 1, Dex::PumpfunSell),
                VenueEndpoints { source: mid, destination: dst, input_mint: token, output_mint: wsol },
            ),
        ];
        assert!(check_route_continuity(&resolved, &endpoints).is_ok());

        // Second hop reading from the wrong account breaks the chain
        let mut broken = resolved.clone();
        broken[1].1.source = Pubkey::new_unique();
        assert!(matches!(
            check_route_continuity(&broken, &endpoints),
            Err(RouterError::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_continuity_rejects_wrong_destination() {
        let wsol = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let src = Pubkey::new_unique();
        let endpoints = RouteEndpoints {
            source: src,
            destination: Pubkey::new_unique(),
            source_mint: wsol,
            destination_mint: token,
        };
        let resolved = vec![(
            venue(0, 0, Dex::PumpfunBuy),
            VenueEndpoints { source: src, destination: Pubkey::new_unique(), input_mint: wsol, output_mint: token },
        )];

        let err = check_route_continuity(&resolved, &endpoints).unwrap_err();
        assert!(err.to_string().contains("instead of destination"));
    }
}
