//! Application Layer - Settlement entry points

pub mod executor;
pub mod router;

pub use executor::RouteExecutor;
pub use router::{ProxySwapAccounts, SwapAccounts, SwapRouter};
