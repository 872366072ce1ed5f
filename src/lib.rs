//! Route Settler - Solana swap-route settlement engine
//!
//! Takes a swap plan (parallel routes, each a chain of hops, each hop split
//! across weighted venues) together with the caller's token accounts and a
//! flat list of venue accounts, and settles it atomically against a ledger.
//!
//! # Modules
//!
//! - `domain`: Plans, plan validation, account binding, the slippage guard
//! - `ports`: The ledger abstraction settlements run against
//! - `adapters`: Venue adapters (pump.fun) and the simulated ledger
//! - `config`: Configuration loading, validation and logging setup
//! - `application`: Route executor and the `SwapRouter` entry points

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

pub use application::{ProxySwapAccounts, SwapAccounts, SwapRouter};
pub use domain::{RouterError, SettlementResult, SwapPlan};
