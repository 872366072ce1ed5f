//! Pump.fun Account Layouts
//!
//! Slot order of the buy and sell windows, the PDAs they are pinned to and
//! the constraint walk both adapters share.

use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey, system_program};

use crate::adapters::pump_fun::curve::BondingCurveState;
use crate::adapters::venue::{check_arity, check_slot, SlotConstraint, SlotSpec};
use crate::domain::account_binding::AccountSlot;
use crate::domain::error::RouterError;
use crate::domain::known_programs::associated_token_address;
use crate::domain::plan::Dex;
use crate::ports::ledger::LedgerPort;

pub const GLOBAL_SEED: &[u8] = b"global";
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";
pub const CREATOR_VAULT_SEED: &[u8] = b"creator-vault";
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

/// Role of a slot in a pump.fun window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpSlot {
    Program,
    Payer,
    /// Token account the venue spends from
    Source,
    /// Token account the venue pays into
    Destination,
    Global,
    FeeRecipient,
    Mint,
    BondingCurve,
    AssociatedBondingCurve,
    SystemProgram,
    TokenProgram,
    CreatorVault,
    EventAuthority,
}

impl PumpSlot {
    pub const fn spec(self) -> SlotSpec {
        match self {
            PumpSlot::Program => SlotSpec::new("program", false, false, SlotConstraint::Address),
            PumpSlot::Payer => SlotSpec::new("payer", true, true, SlotConstraint::Unchecked),
            PumpSlot::Source => SlotSpec::new("source", true, false, SlotConstraint::Unchecked),
            PumpSlot::Destination => SlotSpec::new("destination", true, false, SlotConstraint::Unchecked),
            PumpSlot::Global => SlotSpec::new("global", false, false, SlotConstraint::Address),
            PumpSlot::FeeRecipient => SlotSpec::new("fee_recipient", true, false, SlotConstraint::Unchecked),
            PumpSlot::Mint => SlotSpec::new("mint", false, false, SlotConstraint::Unchecked),
            PumpSlot::BondingCurve => SlotSpec::new("bonding_curve", true, false, SlotConstraint::Seeds),
            PumpSlot::AssociatedBondingCurve => {
                SlotSpec::new("associated_bonding_curve", true, false, SlotConstraint::Seeds)
            }
            PumpSlot::SystemProgram => SlotSpec::new("system_program", false, false, SlotConstraint::Address),
            PumpSlot::TokenProgram => SlotSpec::new("token_program", false, false, SlotConstraint::Address),
            PumpSlot::CreatorVault => SlotSpec::new("creator_vault", true, false, SlotConstraint::Seeds),
            PumpSlot::EventAuthority => SlotSpec::new("event_authority", false, false, SlotConstraint::Address),
        }
    }
}

pub const BUY_ROLES: [PumpSlot; 13] = [
    PumpSlot::Program,
    PumpSlot::Payer,
    PumpSlot::Source,
    PumpSlot::Destination,
    PumpSlot::Global,
    PumpSlot::FeeRecipient,
    PumpSlot::Mint,
    PumpSlot::BondingCurve,
    PumpSlot::AssociatedBondingCurve,
    PumpSlot::SystemProgram,
    PumpSlot::TokenProgram,
    PumpSlot::CreatorVault,
    PumpSlot::EventAuthority,
];

/// Sell keeps pump.fun's own order: creator vault before token program
pub const SELL_ROLES: [PumpSlot; 13] = [
    PumpSlot::Program,
    PumpSlot::Payer,
    PumpSlot::Source,
    PumpSlot::Destination,
    PumpSlot::Global,
    PumpSlot::FeeRecipient,
    PumpSlot::Mint,
    PumpSlot::BondingCurve,
    PumpSlot::AssociatedBondingCurve,
    PumpSlot::SystemProgram,
    PumpSlot::CreatorVault,
    PumpSlot::TokenProgram,
    PumpSlot::EventAuthority,
];

pub static BUY_LAYOUT: [SlotSpec; 13] = layout_of(BUY_ROLES);
pub static SELL_LAYOUT: [SlotSpec; 13] = layout_of(SELL_ROLES);

const fn layout_of(roles: [PumpSlot; 13]) -> [SlotSpec; 13] {
    let mut layout = [PumpSlot::Program.spec(); 13];
    let mut i = 0;
    while i < 13 {
        layout[i] = roles[i].spec();
        i += 1;
    }
    layout
}

pub fn global_pda(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[GLOBAL_SEED], program_id).0
}

pub fn event_authority_pda(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[EVENT_AUTHORITY_SEED], program_id).0
}

pub fn bonding_curve_pda(program_id: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[BONDING_CURVE_SEED, mint.as_ref()], program_id).0
}

pub fn creator_vault_pda(program_id: &Pubkey, creator: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[CREATOR_VAULT_SEED, creator.as_ref()], program_id).0
}

/// Token account of the bonding curve holding the unsold supply
pub fn associated_bonding_curve(bonding_curve: &Pubkey, mint: &Pubkey) -> Pubkey {
    associated_token_address(bonding_curve, mint, &spl_token::id())
}

/// Read and decode a bonding curve owned by `program_id`
pub fn load_curve<L: LedgerPort + ?Sized>(
    ledger: &L,
    address: &Pubkey,
    program_id: &Pubkey,
) -> Result<BondingCurveState, RouterError> {
    let account = ledger
        .account(address)
        .ok_or_else(|| RouterError::InvalidAccountData(format!("bonding curve {} does not exist", address)))?;
    if account.owner != *program_id {
        return Err(RouterError::InvalidAccountData(format!(
            "bonding curve {} owned by {}",
            address, account.owner
        )));
    }
    BondingCurveState::decode(&account.data)
}

/// A pump.fun window that passed every slot constraint
#[derive(Debug, Clone)]
pub struct PumpAccounts {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub mint: Pubkey,
    pub curve: BondingCurveState,
}

fn address_of(roles: &[PumpSlot], accounts: &[AccountSlot], role: PumpSlot) -> Pubkey {
    roles
        .iter()
        .position(|r| *r == role)
        .and_then(|idx| accounts.get(idx))
        .map(|slot| slot.address)
        .unwrap_or_default()
}

/// Walk the window in slot order, checking each slot's constraints
///
/// The curve is decoded as soon as its slot passes, since the creator vault
/// further down is seeded by the creator it records.
pub fn verify_window<L: LedgerPort + ?Sized>(
    venue: Dex,
    program_id: &Pubkey,
    roles: &[PumpSlot],
    layout: &[SlotSpec],
    accounts: &[AccountSlot],
    ledger: &L,
) -> Result<PumpAccounts, RouterError> {
    check_arity(venue, layout, accounts)?;

    let mint = address_of(roles, accounts, PumpSlot::Mint);
    let bonding_curve = bonding_curve_pda(program_id, &mint);
    let mut curve: Option<BondingCurveState> = None;

    for ((role, spec), slot) in roles.iter().zip(layout).zip(accounts) {
        let expected = match role {
            PumpSlot::Program => Some(*program_id),
            PumpSlot::Global => Some(global_pda(program_id)),
            PumpSlot::BondingCurve => Some(bonding_curve),
            PumpSlot::AssociatedBondingCurve => Some(associated_bonding_curve(&bonding_curve, &mint)),
            PumpSlot::SystemProgram => Some(system_program::id()),
            PumpSlot::TokenProgram => Some(spl_token::id()),
            PumpSlot::CreatorVault => match &curve {
                Some(state) => Some(creator_vault_pda(program_id, &state.creator)),
                None => {
                    return Err(RouterError::InvalidAccountData(
                        "creator vault precedes bonding curve".to_string(),
                    ))
                }
            },
            PumpSlot::EventAuthority => Some(event_authority_pda(program_id)),
            _ => None,
        };
        check_slot(spec, slot, expected.as_ref())?;

        if *role == PumpSlot::BondingCurve {
            let state = load_curve(ledger, &slot.address, program_id)?;
            if state.complete {
                return Err(RouterError::InvalidAccountData(format!(
                    "bonding curve for {} is complete",
                    mint
                )));
            }
            curve = Some(state);
        }
    }

    let curve = curve.ok_or_else(|| RouterError::InvalidAccountData("no bonding curve slot".to_string()))?;

    Ok(PumpAccounts {
        source: address_of(roles, accounts, PumpSlot::Source),
        destination: address_of(roles, accounts, PumpSlot::Destination),
        mint,
        curve,
    })
}

/// Accounts needed to fill a pump.fun window
#[derive(Debug, Clone)]
pub struct PumpWindow {
    pub program_id: Pubkey,
    pub payer: Pubkey,
    pub source: Pubkey,
    pub destination: Pubkey,
    pub fee_recipient: Pubkey,
    pub mint: Pubkey,
    pub creator: Pubkey,
}

impl PumpWindow {
    fn meta(&self, role: PumpSlot) -> AccountMeta {
        let bonding_curve = bonding_curve_pda(&self.program_id, &self.mint);
        let address = match role {
            PumpSlot::Program => self.program_id,
            PumpSlot::Payer => self.payer,
            PumpSlot::Source => self.source,
            PumpSlot::Destination => self.destination,
            PumpSlot::Global => global_pda(&self.program_id),
            PumpSlot::FeeRecipient => self.fee_recipient,
            PumpSlot::Mint => self.mint,
            PumpSlot::BondingCurve => bonding_curve,
            PumpSlot::AssociatedBondingCurve => associated_bonding_curve(&bonding_curve, &self.mint),
            PumpSlot::SystemProgram => system_program::id(),
            PumpSlot::TokenProgram => spl_token::id(),
            PumpSlot::CreatorVault => creator_vault_pda(&self.program_id, &self.creator),
            PumpSlot::EventAuthority => event_authority_pda(&self.program_id),
        };
        let spec = role.spec();
        if spec.writable {
            AccountMeta::new(address, spec.signer)
        } else {
            AccountMeta::new_readonly(address, spec.signer)
        }
    }

    /// Binding entries for a buy, in slot order
    pub fn buy_metas(&self) -> Vec<AccountMeta> {
        BUY_ROLES.iter().map(|role| self.meta(*role)).collect()
    }

    /// Binding entries for a sell, in slot order
    pub fn sell_metas(&self) -> Vec<AccountMeta> {
        SELL_ROLES.iter().map(|role| self.meta(*role)).collect()
    }
}
