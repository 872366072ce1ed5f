//! Weighted Split
//!
//! Splits a hop's running amount across its venues by integer percentage.
//! Every venue but the last receives `floor(amount * weight / 100)`; the last
//! venue absorbs whatever remains, so shares always sum to the input.

use crate::domain::error::RouterError;

/// Split `amount` by `weights` (percentages summing to 100)
pub fn split_by_weights(amount: u64, weights: &[u8]) -> Result<Vec<u64>, RouterError> {
    let Some((_, leading)) = weights.split_last() else {
        return Ok(Vec::new());
    };

    let mut shares = Vec::with_capacity(weights.len());
    let mut allocated: u64 = 0;

    for weight in leading {
        // u128 keeps amount * 100 from overflowing for any u64 amount
        let share = (amount as u128 * *weight as u128 / 100) as u64;
        allocated = allocated
            .checked_add(share)
            .ok_or(RouterError::ArithmeticOverflow)?;
        shares.push(share);
    }

    let remainder = amount
        .checked_sub(allocated)
        .ok_or(RouterError::ArithmeticOverflow)?;
    shares.push(remainder);

    Ok(shares)
}
