//! SPL token program semantics for the simulated ledger

use solana_sdk::instruction::Instruction;
use spl_token::instruction::TokenInstruction;

use super::SimulatedLedger;
use crate::ports::ledger::LedgerError;

pub(super) fn execute(ledger: &mut SimulatedLedger, instruction: &Instruction) -> Result<(), LedgerError> {
    let unpacked = TokenInstruction::unpack(&instruction.data)
        .map_err(|e| LedgerError::InstructionRejected(format!("token instruction: {}", e)))?;

    match unpacked {
        TokenInstruction::Transfer { amount } => transfer(ledger, instruction, amount),
        _ => Err(LedgerError::InstructionRejected(
            "only Transfer is simulated".to_string(),
        )),
    }
}

fn transfer(ledger: &mut SimulatedLedger, instruction: &Instruction, amount: u64) -> Result<(), LedgerError> {
    let [source, destination, authority, ..] = instruction.accounts.as_slice() else {
        return Err(LedgerError::InstructionRejected("transfer needs 3 accounts".to_string()));
    };

    let mut from = ledger.token_state(&source.pubkey)?;
    let mut to = ledger.token_state(&destination.pubkey)?;

    if !authority.is_signer || from.owner != authority.pubkey {
        return Err(LedgerError::InstructionRejected(format!(
            "{} cannot move tokens out of {}",
            authority.pubkey, source.pubkey
        )));
    }
    if from.mint != to.mint {
        return Err(LedgerError::InstructionRejected("mint mismatch".to_string()));
    }
    if from.amount < amount {
        return Err(LedgerError::InsufficientFunds {
            account: source.pubkey,
            needed: amount,
            available: from.amount,
        });
    }

    if source.pubkey == destination.pubkey {
        return Ok(());
    }
    from.amount -= amount;
    to.amount = to
        .amount
        .checked_add(amount)
        .ok_or_else(|| LedgerError::InstructionRejected("token amount overflow".to_string()))?;
    ledger.write_token_state(&source.pubkey, from)?;
    ledger.write_token_state(&destination.pubkey, to)
}
