//! Domain Layer - Settlement rules with no ledger access
//!
//! - `plan`: Swap plans and settlement results
//! - `plan_validator`: Structural plan checks run before anything else
//! - `account_binding`: Assigns account windows to venues
//! - `split`: Weighted intra-hop splitting
//! - `slippage_guard`: Pre/post settlement balance checks
//! - `known_programs`: Well-known program ids and address derivations
//! - `error`: Router error codes

pub mod account_binding;
pub mod error;
pub mod known_programs;
pub mod plan;
pub mod plan_validator;
pub mod slippage_guard;
pub mod split;

pub use account_binding::{
    check_route_continuity, AccountBinding, AccountSlot, BindingSlice, EntryPath, RouteEndpoints,
    VenueEndpoints, VenueSlot,
};
pub use error::RouterError;
pub use known_programs::{associated_token_address, native_mint, pumpfun_program_id};
pub use plan::{Dex, Hop, HopSettlement, Route, SettlementResult, SettlementStatus, SwapPlan};
pub use plan_validator::{PlanValidator, DEFAULT_MAX_HOPS_PER_ROUTE};
pub use slippage_guard::{SettlementOutcome, SettlementSnapshot, SlippageGuard, SlippageGuardConfig};
pub use split::split_by_weights;
