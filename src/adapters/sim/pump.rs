//! Pump.fun program semantics for the simulated ledger
//!
//! Accounts arrive in adapter window order without the program slot:
//! payer, source, destination, global, fee recipient, mint, bonding curve,
//! associated bonding curve, then programs and PDAs the simulation ignores.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use super::SimulatedLedger;
use crate::adapters::pump_fun::{protocol_fee, BondingCurveState, PumpArgs, BUY_DISCRIMINATOR, SELL_DISCRIMINATOR};
use crate::ports::ledger::LedgerError;

const PAYER: usize = 0;
const SOURCE: usize = 1;
const DESTINATION: usize = 2;
const FEE_RECIPIENT: usize = 4;
const MINT: usize = 5;
const BONDING_CURVE: usize = 6;
const ASSOCIATED_BONDING_CURVE: usize = 7;
const MIN_ACCOUNTS: usize = 12;

struct Keys {
    source: Pubkey,
    destination: Pubkey,
    fee_recipient: Pubkey,
    mint: Pubkey,
    bonding_curve: Pubkey,
    vault: Pubkey,
}

pub(super) fn execute(ledger: &mut SimulatedLedger, instruction: &Instruction) -> Result<(), LedgerError> {
    let (discriminator, args) = PumpArgs::decode(&instruction.data)
        .ok_or_else(|| rejected("instruction data too short"))?;

    let metas = &instruction.accounts;
    if metas.len() < MIN_ACCOUNTS {
        return Err(rejected(format!("{} accounts, need {}", metas.len(), MIN_ACCOUNTS)));
    }
    if !metas[PAYER].is_signer {
        return Err(rejected("payer did not sign"));
    }
    let keys = Keys {
        source: metas[SOURCE].pubkey,
        destination: metas[DESTINATION].pubkey,
        fee_recipient: metas[FEE_RECIPIENT].pubkey,
        mint: metas[MINT].pubkey,
        bonding_curve: metas[BONDING_CURVE].pubkey,
        vault: metas[ASSOCIATED_BONDING_CURVE].pubkey,
    };

    match discriminator {
        BUY_DISCRIMINATOR => buy(ledger, &keys, args),
        SELL_DISCRIMINATOR => sell(ledger, &keys, args),
        _ => Err(rejected("unknown pump.fun instruction")),
    }
}

fn rejected(reason: impl Into<String>) -> LedgerError {
    LedgerError::InstructionRejected(reason.into())
}

fn load_curve(ledger: &SimulatedLedger, keys: &Keys) -> Result<BondingCurveState, LedgerError> {
    let account = ledger
        .get_account(&keys.bonding_curve)
        .ok_or(LedgerError::AccountNotFound(keys.bonding_curve))?;
    if account.owner != ledger.pump_program() {
        return Err(rejected("bonding curve not owned by pump.fun"));
    }
    let curve = BondingCurveState::decode(&account.data).map_err(|e| rejected(e.to_string()))?;
    if curve.complete {
        return Err(rejected("BondingCurveComplete"));
    }
    Ok(curve)
}

fn store_curve(ledger: &mut SimulatedLedger, keys: &Keys, curve: &BondingCurveState) -> Result<(), LedgerError> {
    ledger.account_mut(&keys.bonding_curve)?.data = curve.encode();
    Ok(())
}

/// Move `amount` of token units between two token accounts of the same mint
fn move_tokens(ledger: &mut SimulatedLedger, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), LedgerError> {
    debit_tokens(ledger, from, amount)?;
    credit_tokens(ledger, to, amount)
}

fn expect_mint(ledger: &SimulatedLedger, account: &Pubkey, mint: &Pubkey) -> Result<(), LedgerError> {
    if ledger.token_state(account)?.mint != *mint {
        return Err(rejected(format!("{} does not hold mint {}", account, mint)));
    }
    Ok(())
}

fn debit_tokens(ledger: &mut SimulatedLedger, account: &Pubkey, amount: u64) -> Result<(), LedgerError> {
    let mut state = ledger.token_state(account)?;
    if state.amount < amount {
        return Err(LedgerError::InsufficientFunds {
            account: *account,
            needed: amount,
            available: state.amount,
        });
    }
    state.amount -= amount;
    ledger.write_token_state(account, state)
}

fn credit_tokens(ledger: &mut SimulatedLedger, account: &Pubkey, amount: u64) -> Result<(), LedgerError> {
    let mut state = ledger.token_state(account)?;
    state.amount = state
        .amount
        .checked_add(amount)
        .ok_or_else(|| rejected("token amount overflow"))?;
    ledger.write_token_state(account, state)
}

/// Buy exactly `args.amount` tokens for at most `args.limit` wrapped lamports
fn buy(ledger: &mut SimulatedLedger, keys: &Keys, args: PumpArgs) -> Result<(), LedgerError> {
    let mut curve = load_curve(ledger, keys)?;
    let native = spl_token::native_mint::id();
    expect_mint(ledger, &keys.source, &native)?;
    expect_mint(ledger, &keys.destination, &keys.mint)?;

    let tokens = args.amount;
    if tokens > curve.real_token_reserves {
        return Err(rejected("NotEnoughTokensToBuy"));
    }
    let cost = curve
        .buy_cost(tokens)
        .ok_or_else(|| rejected("buy would drain virtual reserves"))?;
    let fee = protocol_fee(cost, ledger.pump_fee_bps());
    let total = cost.checked_add(fee).ok_or_else(|| rejected("cost overflow"))?;
    if total > args.limit {
        return Err(rejected(format!("TooMuchSolRequired: {} > {}", total, args.limit)));
    }

    debit_tokens(ledger, &keys.source, total)?;
    move_tokens(ledger, &keys.vault, &keys.destination, tokens)?;

    let curve_account = ledger.account_mut(&keys.bonding_curve)?;
    curve_account.lamports = curve_account
        .lamports
        .checked_add(cost)
        .ok_or_else(|| rejected("lamport overflow"))?;
    ledger.credit_lamports(&keys.fee_recipient, fee)?;

    curve.apply_buy(tokens, cost).ok_or_else(|| rejected("reserve underflow"))?;
    store_curve(ledger, keys, &curve)?;

    tracing::debug!("sim buy: {} tokens for {} + {} fee lamports", tokens, cost, fee);
    Ok(())
}

/// Sell `args.amount` tokens for at least `args.limit` lamports after fee
fn sell(ledger: &mut SimulatedLedger, keys: &Keys, args: PumpArgs) -> Result<(), LedgerError> {
    let mut curve = load_curve(ledger, keys)?;
    let native = spl_token::native_mint::id();
    expect_mint(ledger, &keys.source, &keys.mint)?;
    expect_mint(ledger, &keys.destination, &native)?;

    let tokens = args.amount;
    let gross = curve.sell_proceeds(tokens);
    if gross > curve.real_sol_reserves {
        return Err(rejected("NotEnoughSolInCurve"));
    }
    // Fee never exceeds proceeds, whatever the configured bps
    let fee = protocol_fee(gross, ledger.pump_fee_bps()).min(gross);
    let net = gross - fee;
    if net < args.limit {
        return Err(rejected(format!("TooLittleSolReceived: {} < {}", net, args.limit)));
    }

    move_tokens(ledger, &keys.source, &keys.vault, tokens)?;
    credit_tokens(ledger, &keys.destination, net)?;

    let curve_account = ledger.account_mut(&keys.bonding_curve)?;
    curve_account.lamports = curve_account
        .lamports
        .checked_sub(gross)
        .ok_or_else(|| rejected("bonding curve lamports underflow"))?;
    ledger.credit_lamports(&keys.fee_recipient, fee)?;

    curve.apply_sell(tokens, gross).ok_or_else(|| rejected("reserve underflow"))?;
    store_curve(ledger, keys, &curve)?;

    tracing::debug!("sim sell: {} tokens for {} lamports ({} fee)", tokens, net, fee);
    Ok(())
}
