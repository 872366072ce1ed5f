//! Known Program Addresses
//!
//! Program ids and mints venue adapters pin their account layouts to, plus
//! the associated token account derivation.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Pump.fun bonding curve program (mainnet)
pub const PUMPFUN_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Associated Token Account program
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Native SOL mint (wrapped SOL)
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Parse the mainnet pump.fun program id
pub fn pumpfun_program_id() -> Pubkey {
    // Constant is a valid base58 key; fall back to default only to stay panic-free
    Pubkey::from_str(PUMPFUN_PROGRAM_ID).unwrap_or_default()
}

/// Parse the associated token account program id
pub fn associated_token_program_id() -> Pubkey {
    Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID).unwrap_or_default()
}

/// Wrapped SOL mint
pub fn native_mint() -> Pubkey {
    spl_token::native_mint::id()
}

/// Derive the associated token account for `owner` and `mint`
///
/// Same seeds as the ATA program: `[owner, token_program, mint]`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &associated_token_program_id(),
    )
    .0
}
