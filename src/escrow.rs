//! Escrow Ledger - funds committed against outstanding dividends
//!
//! Tracks, per payout asset, the total amount currently owed across all
//! non-recycled dividends in that asset. Deposits validate against it:
//! custody actually held minus escrow already committed is what is free to
//! back a new dividend.
//!
//! # Invariants (ENFORCED by private fields):
//! - `balance(asset) == Σ remaining_amount` over non-recycled dividends in
//!   that asset, after every engine operation
//! - No overflow/underflow (checked arithmetic)
//! - A release never exceeds the committed balance
//! - All state changes return Result

use crate::core_types::PayoutAsset;
use crate::errors::DividendError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Per-asset committed funds. Mutated only by the distribution engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscrowLedger {
    committed: FxHashMap<PayoutAsset, u64>, // PRIVATE - mutate via commit/release
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed balance for an asset (read-only). Zero if never committed.
    pub fn balance(&self, asset: PayoutAsset) -> u64 {
        self.committed.get(&asset).copied().unwrap_or(0)
    }

    /// Commit `amount` of `asset` against a new dividend obligation.
    ///
    /// # Errors
    /// Returns `FundsNotTransferred` on overflow: an escrow total that no
    /// custodian could hold means the deposit was never actually funded.
    pub fn commit(&mut self, asset: PayoutAsset, amount: u64) -> Result<(), DividendError> {
        let slot = self.committed.entry(asset).or_insert(0);
        *slot = slot
            .checked_add(amount)
            .ok_or(DividendError::FundsNotTransferred)?;
        Ok(())
    }

    /// Release `amount` of `asset` after a claim payout or a recycle sweep.
    ///
    /// # Errors
    /// Returns `NothingToRecycle` if the release exceeds the committed
    /// balance: the obligation being settled does not exist.
    pub fn release(&mut self, asset: PayoutAsset, amount: u64) -> Result<(), DividendError> {
        let slot = self
            .committed
            .get_mut(&asset)
            .ok_or(DividendError::NothingToRecycle)?;
        *slot = slot
            .checked_sub(amount)
            .ok_or(DividendError::NothingToRecycle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: PayoutAsset = PayoutAsset::Token(7);

    #[test]
    fn test_commit_release() {
        let mut escrow = EscrowLedger::new();
        assert_eq!(escrow.balance(TOKEN), 0);

        escrow.commit(TOKEN, 100).unwrap();
        assert_eq!(escrow.balance(TOKEN), 100);

        escrow.release(TOKEN, 60).unwrap();
        assert_eq!(escrow.balance(TOKEN), 40);

        escrow.release(TOKEN, 40).unwrap();
        assert_eq!(escrow.balance(TOKEN), 0);
    }

    #[test]
    fn test_release_exceeding_committed_fails() {
        let mut escrow = EscrowLedger::new();
        escrow.commit(TOKEN, 50).unwrap();

        assert!(escrow.release(TOKEN, 51).is_err());
        assert_eq!(escrow.balance(TOKEN), 50); // Unchanged

        assert!(escrow.release(PayoutAsset::Native, 1).is_err());
    }

    #[test]
    fn test_commit_overflow_fails() {
        let mut escrow = EscrowLedger::new();
        escrow.commit(TOKEN, u64::MAX).unwrap();

        assert!(escrow.commit(TOKEN, 1).is_err());
        assert_eq!(escrow.balance(TOKEN), u64::MAX);
    }

    #[test]
    fn test_assets_are_independent() {
        let mut escrow = EscrowLedger::new();
        escrow.commit(TOKEN, 100).unwrap();
        escrow.commit(PayoutAsset::Native, 30).unwrap();

        escrow.release(TOKEN, 100).unwrap();
        assert_eq!(escrow.balance(TOKEN), 0);
        assert_eq!(escrow.balance(PayoutAsset::Native), 30);
    }
}
