use solana_sdk::{
    instruction::Instruction, program_option::COption, program_pack::Pack, pubkey::Pubkey, system_program,
};
use spl_token::state::{Account as TokenAccount, AccountState, Mint};
use std::cell::Cell;
use std::collections::HashMap;

use crate::adapters::pump_fun::{associated_bonding_curve, bonding_curve_pda, BondingCurveState, DEFAULT_FEE_BPS};
use crate::domain::known_programs::pumpfun_program_id;
use crate::ports::ledger::{AccountSnapshot, LedgerError, LedgerPort};

/// Rent-exempt balance given to accounts created by the helpers
const RENT_EXEMPT_LAMPORTS: u64 = 2_039_280;

#[derive(Debug, Clone)]
pub struct SimulatedLedger {
    accounts: HashMap<Pubkey, AccountSnapshot>,
    pump_program: Pubkey,
    pump_fee_bps: u16,
    invocations: Vec<Instruction>,
    reads: Cell<u64>,
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLedger {
    /// Empty ledger running mainnet pump.fun with the default fee
    pub fn new() -> Self {
        Self::with_pump_program(pumpfun_program_id(), DEFAULT_FEE_BPS)
    }

    pub fn with_pump_program(program_id: Pubkey, fee_bps: u16) -> Self {
        Self {
            accounts: HashMap::new(),
            pump_program: program_id,
            pump_fee_bps: fee_bps,
            invocations: Vec::new(),
            reads: Cell::new(0),
        }
    }

    pub fn pump_program(&self) -> Pubkey {
        self.pump_program
    }

    pub fn pump_fee_bps(&self) -> u16 {
        self.pump_fee_bps
    }

    /// Run `f` as one transaction: on `Err` every account and the
    /// invocation log are restored to their state before the call
    pub fn process_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let accounts = self.accounts.clone();
        let executed = self.invocations.len();

        let result = f(self);
        if result.is_err() {
            self.accounts = accounts;
            self.invocations.truncate(executed);
            tracing::debug!("Simulated transaction rolled back");
        }
        result
    }

    pub fn set_account(&mut self, address: Pubkey, account: AccountSnapshot) {
        self.accounts.insert(address, account);
    }

    pub fn get_account(&self, address: &Pubkey) -> Option<&AccountSnapshot> {
        self.accounts.get(address)
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.accounts.get(address).map(|a| a.lamports).unwrap_or(0)
    }

    /// Create an initialized SPL mint
    pub fn add_mint(&mut self, address: Pubkey, decimals: u8) {
        let mint = Mint {
            mint_authority: COption::None,
            supply: 0,
            decimals,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; Mint::LEN];
        if let Err(e) = Mint::pack(mint, &mut data) {
            tracing::error!("Cannot pack mint {}: {}", address, e);
            return;
        }
        self.set_account(address, AccountSnapshot::new(spl_token::id(), RENT_EXEMPT_LAMPORTS, data));
    }

    /// Create an initialized SPL token account
    pub fn add_token_account(&mut self, address: Pubkey, mint: Pubkey, owner: Pubkey, amount: u64) {
        let account = TokenAccount {
            mint,
            owner,
            amount,
            state: AccountState::Initialized,
            is_native: if mint == spl_token::native_mint::id() {
                COption::Some(RENT_EXEMPT_LAMPORTS)
            } else {
                COption::None
            },
            ..TokenAccount::default()
        };
        let mut data = vec![0u8; TokenAccount::LEN];
        if let Err(e) = TokenAccount::pack(account, &mut data) {
            tracing::error!("Cannot pack token account {}: {}", address, e);
            return;
        }
        self.set_account(address, AccountSnapshot::new(spl_token::id(), RENT_EXEMPT_LAMPORTS, data));
    }

    /// Install a bonding curve for `mint` plus its token vault
    ///
    /// The vault holds `real_token_reserves`. Returns the curve address.
    pub fn add_bonding_curve(&mut self, mint: Pubkey, state: &BondingCurveState) -> Pubkey {
        let curve = bonding_curve_pda(&self.pump_program, &mint);
        self.set_account(
            curve,
            AccountSnapshot::new(
                self.pump_program,
                RENT_EXEMPT_LAMPORTS.saturating_add(state.real_sol_reserves),
                state.encode(),
            ),
        );
        self.add_token_account(
            associated_bonding_curve(&curve, &mint),
            mint,
            curve,
            state.real_token_reserves,
        );
        curve
    }

    pub fn bonding_curve(&self, mint: &Pubkey) -> Option<BondingCurveState> {
        let curve = bonding_curve_pda(&self.pump_program, mint);
        self.accounts
            .get(&curve)
            .and_then(|account| BondingCurveState::decode(&account.data).ok())
    }

    /// Instructions executed so far, oldest first
    pub fn invocations(&self) -> &[Instruction] {
        &self.invocations
    }

    /// Number of `account` and `token_balance` reads served
    pub fn account_reads(&self) -> u64 {
        self.reads.get()
    }

    pub(super) fn token_state(&self, address: &Pubkey) -> Result<TokenAccount, LedgerError> {
        let account = self
            .accounts
            .get(address)
            .ok_or(LedgerError::AccountNotFound(*address))?;
        account.token_account().ok_or(LedgerError::NotATokenAccount(*address))
    }

    pub(super) fn write_token_state(&mut self, address: &Pubkey, state: TokenAccount) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound(*address))?;
        TokenAccount::pack(state, &mut account.data).map_err(|_| LedgerError::NotATokenAccount(*address))
    }

    pub(super) fn account_mut(&mut self, address: &Pubkey) -> Result<&mut AccountSnapshot, LedgerError> {
        self.accounts
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    pub(super) fn credit_lamports(&mut self, address: &Pubkey, lamports: u64) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| AccountSnapshot::new(system_program::id(), 0, Vec::new()));
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or_else(|| LedgerError::InstructionRejected("lamport overflow".to_string()))?;
        Ok(())
    }
}

impl LedgerPort for SimulatedLedger {
    fn account(&self, address: &Pubkey) -> Option<AccountSnapshot> {
        self.reads.set(self.reads.get() + 1);
        self.accounts.get(address).cloned()
    }

    fn token_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.token_state(address)?.amount)
    }

    /// Instructions are all-or-nothing, like on chain
    fn invoke(&mut self, instruction: &Instruction) -> Result<(), LedgerError> {
        let program_id = instruction.program_id;
        if program_id != self.pump_program && program_id != spl_token::id() {
            return Err(LedgerError::UnsupportedProgram(program_id));
        }

        self.process_transaction(|ledger| {
            if program_id == ledger.pump_program {
                super::pump::execute(ledger, instruction)
            } else {
                super::token::execute(ledger, instruction)
            }
        })?;

        self.invocations.push(instruction.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::pump_fun::sample_curve;

    #[test]
    fn test_token_account_helpers() {
        let mut ledger = SimulatedLedger::new();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        ledger.add_token_account(address, mint, owner, 77);

        assert_eq!(ledger.token_balance(&address), Ok(77));
        assert_eq!(ledger.token_state(&address).unwrap().owner, owner);
        assert!(matches!(
            ledger.token_balance(&Pubkey::new_unique()),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_add_mint_packs_state() {
        let mut ledger = SimulatedLedger::new();
        let mint = Pubkey::new_unique();
        ledger.add_mint(mint, 6);

        let account = ledger.get_account(&mint).unwrap();
        assert_eq!(account.owner, spl_token::id());
        let state = Mint::unpack(&account.data).unwrap();
        assert_eq!(state.decimals, 6);
        assert!(state.is_initialized);
    }

    #[test]
    fn test_token_balance_of_curve_is_not_a_token_account() {
        let mut ledger = SimulatedLedger::new();
        let mint = Pubkey::new_unique();
        let creator = Pubkey::new_unique();
        let curve = ledger.add_bonding_curve(mint, &sample_curve(creator));

        assert_eq!(ledger.token_balance(&curve), Err(LedgerError::NotATokenAccount(curve)));
        assert_eq!(ledger.bonding_curve(&mint), Some(sample_curve(creator)));
    }

    #[test]
    fn test_unsupported_program() {
        let mut ledger = SimulatedLedger::new();
        let program = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(program, &[], vec![]);
        assert_eq!(ledger.invoke(&ix), Err(LedgerError::UnsupportedProgram(program)));
        assert!(ledger.invocations().is_empty());
    }

    #[test]
    fn test_process_transaction_rolls_back_on_error() {
        let mut ledger = SimulatedLedger::new();
        let address = Pubkey::new_unique();
        ledger.add_token_account(address, Pubkey::new_unique(), Pubkey::new_unique(), 10);
        let before = ledger.get_account(&address).cloned();

        let result: Result<(), LedgerError> = ledger.process_transaction(|l| {
            let mut state = l.token_state(&address)?;
            state.amount = 0;
            l.write_token_state(&address, state)?;
            Err(LedgerError::InstructionRejected("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(ledger.get_account(&address).cloned(), before);
    }

    #[test]
    fn test_process_transaction_keeps_success() {
        let mut ledger = SimulatedLedger::new();
        let address = Pubkey::new_unique();
        ledger.add_token_account(address, Pubkey::new_unique(), Pubkey::new_unique(), 10);

        let result: Result<u64, LedgerError> = ledger.process_transaction(|l| {
            let mut state = l.token_state(&address)?;
            state.amount = 3;
            l.write_token_state(&address, state)?;
            Ok(3)
        });

        assert_eq!(result, Ok(3));
        assert_eq!(ledger.token_balance(&address), Ok(3));
    }
}
