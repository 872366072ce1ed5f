//! Swap Router
//!
//! Entry points of the settlement engine. Both run the same pipeline:
//!
//! 1. validate the plan (no ledger access)
//! 2. assign every venue its account window and verify all of them
//! 3. snapshot balances, execute the routes, check the guard
//!
//! The proxied entry point adds account-shape checks against the acting
//! authority. Its input is staged in an SA-owned source account, so no venue
//! may read the user's source directly; whatever the venues leave unspent is
//! returned, and output staged in an SA destination is paid out.
//! Neither entry point undoes anything on failure; callers run them inside
//! their own transaction.

use solana_sdk::pubkey::Pubkey;

use crate::adapters::venue::{VenueAdapter, VenueRegistry};
use crate::application::executor::RouteExecutor;
use crate::config::loader::{Config, ConfigError};
use crate::domain::account_binding::{
    check_route_continuity, AccountBinding, EntryPath, RouteEndpoints, VenueSlot,
};
use crate::domain::error::RouterError;
use crate::domain::plan::{SettlementResult, SwapPlan};
use crate::domain::plan_validator::{PlanValidator, DEFAULT_MAX_HOPS_PER_ROUTE};
use crate::domain::slippage_guard::{SlippageGuard, SlippageGuardConfig};
use crate::ports::ledger::LedgerPort;

/// Fixed accounts of a direct swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAccounts {
    pub payer: Pubkey,
    pub source_token_account: Pubkey,
    pub destination_token_account: Pubkey,
    pub source_mint: Pubkey,
    pub destination_mint: Pubkey,
}

/// Fixed accounts of a proxied swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxySwapAccounts {
    pub swap: SwapAccounts,
    /// Authority owning the SA token accounts, `payer` acts when absent
    pub sa_authority: Option<Pubkey>,
    /// Input is staged here; venues never read the user's source directly
    pub source_token_sa: Option<Pubkey>,
    pub destination_token_sa: Option<Pubkey>,
    pub source_token_program: Pubkey,
    pub destination_token_program: Pubkey,
}

impl ProxySwapAccounts {
    /// Proxy over the classic token program, SA accounts attached with `with_sa`
    pub fn new(swap: SwapAccounts) -> Self {
        Self {
            swap,
            sa_authority: None,
            source_token_sa: None,
            destination_token_sa: None,
            source_token_program: spl_token::id(),
            destination_token_program: spl_token::id(),
        }
    }

    pub fn with_sa(mut self, authority: Pubkey, source: Option<Pubkey>, destination: Option<Pubkey>) -> Self {
        self.sa_authority = Some(authority);
        self.source_token_sa = source;
        self.destination_token_sa = destination;
        self
    }

    /// Authority venue token accounts must belong to
    pub fn acting_authority(&self) -> Pubkey {
        self.sa_authority.unwrap_or(self.swap.payer)
    }

    fn endpoints(&self) -> RouteEndpoints {
        RouteEndpoints {
            source: self.source_token_sa.unwrap_or(self.swap.source_token_account),
            destination: self.destination_token_sa.unwrap_or(self.swap.destination_token_account),
            source_mint: self.swap.source_mint,
            destination_mint: self.swap.destination_mint,
        }
    }
}

impl SwapAccounts {
    fn endpoints(&self) -> RouteEndpoints {
        RouteEndpoints {
            source: self.source_token_account,
            destination: self.destination_token_account,
            source_mint: self.source_mint,
            destination_mint: self.destination_mint,
        }
    }
}

/// Settlement engine over a fixed set of venues
#[derive(Debug, Clone)]
pub struct SwapRouter {
    validator: PlanValidator,
    registry: VenueRegistry,
    guard_config: SlippageGuardConfig,
}

impl Default for SwapRouter {
    fn default() -> Self {
        Self::new(
            VenueRegistry::default(),
            DEFAULT_MAX_HOPS_PER_ROUTE,
            SlippageGuardConfig::default(),
        )
    }
}

impl SwapRouter {
    pub fn new(registry: VenueRegistry, max_hops_per_route: usize, guard_config: SlippageGuardConfig) -> Self {
        Self {
            validator: PlanValidator::new(max_hops_per_route, registry.selectors()),
            registry,
            guard_config,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            validator: PlanValidator::from_config(config)?,
            registry: VenueRegistry::from_config(config)?,
            guard_config: SlippageGuardConfig {
                enforce_source_spend: config.router.enforce_source_spend,
            },
        })
    }

    pub fn validator(&self) -> &PlanValidator {
        &self.validator
    }

    pub fn registry(&self) -> &VenueRegistry {
        &self.registry
    }

    /// Settle `plan` with the caller's own token accounts
    pub fn route_swap<L: LedgerPort + ?Sized>(
        &self,
        ledger: &mut L,
        accounts: &SwapAccounts,
        plan: &SwapPlan,
        order_id: u64,
        remaining: &AccountBinding,
    ) -> Result<SettlementResult, RouterError> {
        self.validator.validate(plan)?;
        tracing::info!(
            "Order {}: {} {} -> {} over {} routes",
            order_id,
            plan.amount_in,
            accounts.source_mint,
            accounts.destination_mint,
            plan.routes.len()
        );

        let venues = self.prepare(&*ledger, plan, remaining, EntryPath::Direct, None, &accounts.endpoints())?;

        let mut guard = SlippageGuard::with_config(self.guard_config.clone());
        guard.capture_pre_settlement(
            ledger.token_balance(&accounts.destination_token_account)?,
            ledger.token_balance(&accounts.source_token_account)?,
        );

        let hops = RouteExecutor::new(&self.registry).execute(ledger, plan, remaining, &venues)?;

        let outcome = guard.validate_post_settlement(
            plan,
            ledger.token_balance(&accounts.destination_token_account)?,
            ledger.token_balance(&accounts.source_token_account)?,
        )?;

        tracing::info!("Order {} settled: {} out", order_id, outcome.realized_out);
        Ok(SettlementResult::committed(order_id, outcome.realized_out, hops))
    }

    /// Settle `plan` on behalf of an SA authority
    pub fn proxy_swap<L: LedgerPort + ?Sized>(
        &self,
        ledger: &mut L,
        accounts: &ProxySwapAccounts,
        plan: &SwapPlan,
        order_id: u64,
        remaining: &AccountBinding,
    ) -> Result<SettlementResult, RouterError> {
        self.validator.validate(plan)?;
        let swap = &accounts.swap;
        let authority = accounts.acting_authority();
        tracing::info!(
            "Order {}: proxied {} {} -> {} acting as {}",
            order_id,
            plan.amount_in,
            swap.source_mint,
            swap.destination_mint,
            authority
        );

        check_mint_program(&*ledger, &swap.source_mint, &accounts.source_token_program)?;
        check_mint_program(&*ledger, &swap.destination_mint, &accounts.destination_token_program)?;

        let shape = ProxyShape {
            authority,
            user_source: swap.source_token_account,
        };
        let venues = self.prepare(
            &*ledger,
            plan,
            remaining,
            EntryPath::Proxied,
            Some(shape),
            &accounts.endpoints(),
        )?;

        let mut guard = SlippageGuard::with_config(self.guard_config.clone());
        guard.capture_pre_settlement(
            ledger.token_balance(&swap.destination_token_account)?,
            ledger.token_balance(&swap.source_token_account)?,
        );

        let source_sa_before = match accounts.source_token_sa {
            Some(source_sa) => ledger.token_balance(&source_sa)?,
            None => 0,
        };
        if let Some(source_sa) = accounts.source_token_sa {
            let deposit = spl_token::instruction::transfer(
                &accounts.source_token_program,
                &swap.source_token_account,
                &source_sa,
                &swap.payer,
                &[],
                plan.amount_in,
            )
            .map_err(|e| RouterError::InvalidAccountData(format!("source transfer: {}", e)))?;
            ledger.invoke(&deposit)?;
            tracing::debug!("Moved {} into SA account {}", plan.amount_in, source_sa);
        }

        let destination_sa_before = match accounts.destination_token_sa {
            Some(destination_sa) => ledger.token_balance(&destination_sa)?,
            None => 0,
        };

        let hops = RouteExecutor::new(&self.registry).execute(ledger, plan, remaining, &venues)?;

        if let Some(source_sa) = accounts.source_token_sa {
            let held = ledger.token_balance(&source_sa)?;
            let unspent = held
                .checked_sub(source_sa_before)
                .ok_or_else(|| RouterError::SourceOverspent {
                    spent: plan
                        .amount_in
                        .saturating_add(source_sa_before.saturating_sub(held)),
                    amount_in: plan.amount_in,
                })?;
            if unspent > 0 {
                let refund = spl_token::instruction::transfer(
                    &accounts.source_token_program,
                    &source_sa,
                    &swap.source_token_account,
                    &authority,
                    &[],
                    unspent,
                )
                .map_err(|e| RouterError::InvalidAccountData(format!("source refund: {}", e)))?;
                ledger.invoke(&refund)?;
                tracing::debug!("Returned {} unspent from SA account {}", unspent, source_sa);
            }
        }

        if let Some(destination_sa) = accounts.destination_token_sa {
            let produced = ledger
                .token_balance(&destination_sa)?
                .checked_sub(destination_sa_before)
                .ok_or(RouterError::ArithmeticOverflow)?;
            if produced > 0 {
                let payout = spl_token::instruction::transfer(
                    &accounts.destination_token_program,
                    &destination_sa,
                    &swap.destination_token_account,
                    &authority,
                    &[],
                    produced,
                )
                .map_err(|e| RouterError::InvalidAccountData(format!("destination transfer: {}", e)))?;
                ledger.invoke(&payout)?;
                tracing::debug!("Paid {} out of SA account {}", produced, destination_sa);
            }
        }

        let outcome = guard.validate_post_settlement(
            plan,
            ledger.token_balance(&swap.destination_token_account)?,
            ledger.token_balance(&swap.source_token_account)?,
        )?;

        tracing::info!("Order {} settled: {} out", order_id, outcome.realized_out);
        Ok(SettlementResult::committed(order_id, outcome.realized_out, hops))
    }

    /// Direct swap reported as a result instead of an error
    pub fn settle<L: LedgerPort + ?Sized>(
        &self,
        ledger: &mut L,
        accounts: &SwapAccounts,
        plan: &SwapPlan,
        order_id: u64,
        remaining: &AccountBinding,
    ) -> SettlementResult {
        match self.route_swap(ledger, accounts, plan, order_id, remaining) {
            Ok(result) => result,
            Err(e) => {
                if e.is_account_error() {
                    tracing::warn!("Order {} rejected its accounts: {} ({})", order_id, e, e.program_error());
                } else {
                    tracing::error!("Order {} aborted: {} ({})", order_id, e, e.program_error());
                }
                SettlementResult::aborted(order_id, e.code(), e.to_string())
            }
        }
    }

    /// Resolve and verify every venue window before anything executes
    fn prepare<L: LedgerPort + ?Sized>(
        &self,
        ledger: &L,
        plan: &SwapPlan,
        binding: &AccountBinding,
        path: EntryPath,
        shape: Option<ProxyShape>,
        endpoints: &RouteEndpoints,
    ) -> Result<Vec<VenueSlot>, RouterError> {
        let venues = binding.plan_slices(plan, path, |dex| self.registry.arity(dex))?;

        let mut resolved = Vec::with_capacity(venues.len());
        for slot in &venues {
            let venue = self.registry.get(slot.dex)?;
            let accounts = venue.verify(binding.slice(slot.slice), ledger)?;

            if let Some(shape) = shape {
                if accounts.source == shape.user_source {
                    return Err(RouterError::InvalidAccountData(format!(
                        "route {} hop {} {}: reads user source {} directly, proxied input is staged in the SA source",
                        slot.route, slot.hop, slot.dex, shape.user_source
                    )));
                }
                check_token_authority(ledger, &accounts.source, &accounts.input_mint, &shape.authority)?;
                check_token_authority(ledger, &accounts.destination, &accounts.output_mint, &shape.authority)?;
            }
            resolved.push((*slot, accounts));
        }

        check_route_continuity(&resolved, endpoints)?;
        tracing::debug!("Verified {} venue windows", venues.len());
        Ok(venues)
    }
}

/// Account-shape rules of the proxied path
#[derive(Debug, Clone, Copy)]
struct ProxyShape {
    /// Holder every venue token account must belong to
    authority: Pubkey,
    user_source: Pubkey,
}

/// The mint must be owned by the token program named for its side
fn check_mint_program<L: LedgerPort + ?Sized>(
    ledger: &L,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Result<(), RouterError> {
    let account = ledger
        .account(mint)
        .ok_or_else(|| RouterError::InvalidAccountData(format!("mint {} does not exist", mint)))?;
    if account.owner != *token_program {
        return Err(RouterError::InvalidAccountData(format!(
            "mint {} owned by {}, not {}",
            mint, account.owner, token_program
        )));
    }
    Ok(())
}

/// The slot must be an initialized token account of `mint` held by `authority`
fn check_token_authority<L: LedgerPort + ?Sized>(
    ledger: &L,
    address: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
) -> Result<(), RouterError> {
    let token = ledger
        .account(address)
        .and_then(|account| account.token_account())
        .ok_or_else(|| RouterError::InvalidAccountData(format!("{} is not an initialized token account", address)))?;

    if token.owner != *authority {
        return Err(RouterError::InvalidAccountData(format!(
            "{} is held by {}, acting authority is {}",
            address, token.owner, authority
        )));
    }
    if token.mint != *mint {
        return Err(RouterError::InvalidAccountData(format!(
            "{} holds mint {}, expected {}",
            address, token.mint, mint
        )));
    }
    Ok(())
}
