//! Dividend Registry - dividend records and their lifecycle
//!
//! A `Dividend` is created by a deposit, passes through a claim window, and
//! terminates either by full organic claim-out (`Exhausted`) or by an
//! issuer-invoked sweep after the expiry window (`Recycled`).
//!
//! The registry is an arena indexed by the sequential id assigned at
//! deposit. Records expose read-only getters and validated mutations; the
//! distribution engine performs all precondition checks and is the only
//! writer.

use crate::core_types::{AccountId, ClockKey, DividendId, PayoutAsset};
use crate::errors::DividendError;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Expiry window after the payout date, in logical-time units.
/// Equivalent to 5 x 366 days of seconds, the source system's recycle time.
pub const DEFAULT_EXPIRY_WINDOW: ClockKey = 5 * 366 * 24 * 60 * 60;

/// Lifecycle position of a dividend at a given logical time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DividendStatus {
    /// Deposited; the payout date has not arrived.
    Scheduled,
    /// Claims are being accepted.
    Claimable,
    /// The claim window elapsed with funds remaining; only recycle is left.
    Expired,
    /// Fully claimed out before expiry. Terminal.
    Exhausted,
    /// Residue swept back to the wallet. Terminal.
    Recycled,
}

/// Scheduling terms of a deposit, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendTerms {
    /// Logical time at which proportional shares are computed.
    pub snapshot_key: ClockKey,
    pub ex_date: ClockKey,
    pub record_date: ClockKey,
    /// Earliest logical time claims are accepted.
    pub payout_date: ClockKey,
}

/// A single dividend record.
///
/// # Invariants (enforced by private fields):
/// - `total_amount` is immutable after creation
/// - `remaining_amount` starts at `total_amount` and never increases
/// - `remaining_amount == total_amount - Σ(paid claims)` at all times
/// - an account appears in the claimed set at most once
/// - `recycled` is terminal: once set, no mutation is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dividend {
    id: DividendId,
    terms: DividendTerms,
    total_amount: u64,
    payout_asset: PayoutAsset,
    /// Aggregate supply at the snapshot instant. The snapshot is strictly
    /// future at deposit time, so this is captured from the checkpoint
    /// store by the first successful claim, which the engine only accepts
    /// once the snapshot instant has passed. Stable thereafter.
    snapshot_supply: Option<u64>,
    remaining_amount: u64,
    recycled: bool,
    claimed: FxHashSet<AccountId>,
}

impl Dividend {
    fn new(id: DividendId, terms: DividendTerms, amount: u64, asset: PayoutAsset) -> Self {
        Self {
            id,
            terms,
            total_amount: amount,
            payout_asset: asset,
            snapshot_supply: None,
            remaining_amount: amount,
            recycled: false,
            claimed: FxHashSet::default(),
        }
    }

    pub fn id(&self) -> DividendId {
        self.id
    }

    pub fn terms(&self) -> &DividendTerms {
        &self.terms
    }

    pub fn snapshot_key(&self) -> ClockKey {
        self.terms.snapshot_key
    }

    pub fn payout_date(&self) -> ClockKey {
        self.terms.payout_date
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn payout_asset(&self) -> PayoutAsset {
        self.payout_asset
    }

    /// Captured snapshot supply, or zero while still uncaptured.
    pub fn snapshot_supply(&self) -> u64 {
        self.snapshot_supply.unwrap_or(0)
    }

    pub fn remaining_amount(&self) -> u64 {
        self.remaining_amount
    }

    pub fn recycled(&self) -> bool {
        self.recycled
    }

    pub fn has_claimed(&self, account: AccountId) -> bool {
        self.claimed.contains(&account)
    }

    /// Number of accounts that have claimed so far.
    pub fn claimant_count(&self) -> usize {
        self.claimed.len()
    }

    /// End of the claim window: `payout_date + expiry_window`.
    pub fn expiry(&self, expiry_window: ClockKey) -> ClockKey {
        self.terms.payout_date.saturating_add(expiry_window)
    }

    /// Lifecycle position at logical time `now`.
    pub fn status(&self, now: ClockKey, expiry_window: ClockKey) -> DividendStatus {
        if self.recycled {
            DividendStatus::Recycled
        } else if self.remaining_amount == 0 {
            DividendStatus::Exhausted
        } else if now < self.terms.payout_date {
            DividendStatus::Scheduled
        } else if now < self.expiry(expiry_window) {
            DividendStatus::Claimable
        } else {
            DividendStatus::Expired
        }
    }

    /// The captured snapshot supply, if any claim has fixed it yet.
    pub(crate) fn snapshot_capture(&self) -> Option<u64> {
        self.snapshot_supply
    }

    /// Fix the snapshot supply on first use. Later calls are no-ops, so the
    /// denominator every claimant sees is identical.
    pub(crate) fn capture_snapshot_supply(&mut self, supply: u64) -> u64 {
        *self.snapshot_supply.get_or_insert(supply)
    }

    /// Put the capture back to `prior` when a claim is rolled back.
    pub(crate) fn restore_snapshot_capture(&mut self, prior: Option<u64>) {
        self.snapshot_supply = prior;
    }

    /// Book a claim: mark `account` claimed and deduct `share`.
    ///
    /// The engine has already verified the claim window, the recycled flag,
    /// and that `account` has not claimed; this enforces the arithmetic.
    pub(crate) fn apply_claim(
        &mut self,
        account: AccountId,
        share: u64,
    ) -> Result<(), DividendError> {
        if !self.claimed.insert(account) {
            return Err(DividendError::AlreadyClaimed);
        }
        match self.remaining_amount.checked_sub(share) {
            Some(rest) => {
                self.remaining_amount = rest;
                Ok(())
            }
            None => {
                self.claimed.remove(&account);
                Err(DividendError::NoDividendsOwed)
            }
        }
    }

    /// Undo a booked claim after a failed outbound transfer.
    pub(crate) fn revert_claim(&mut self, account: AccountId, share: u64) {
        self.claimed.remove(&account);
        self.remaining_amount = self.remaining_amount.saturating_add(share);
    }

    /// Sweep the residue: zero `remaining_amount`, set the terminal flag.
    /// Returns the swept amount.
    pub(crate) fn apply_recycle(&mut self) -> u64 {
        let swept = self.remaining_amount;
        self.remaining_amount = 0;
        self.recycled = true;
        swept
    }

    /// Undo a sweep after a failed outbound transfer.
    pub(crate) fn revert_recycle(&mut self, swept: u64) {
        self.remaining_amount = swept;
        self.recycled = false;
    }
}

/// Arena of dividend records, indexed by the monotonic id assigned at
/// creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DividendRegistry {
    dividends: Vec<Dividend>,
}

impl DividendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new record and return its id.
    pub fn create(&mut self, terms: DividendTerms, amount: u64, asset: PayoutAsset) -> DividendId {
        let id = self.dividends.len() as DividendId;
        self.dividends.push(Dividend::new(id, terms, amount, asset));
        id
    }

    pub fn get(&self, id: DividendId) -> Result<&Dividend, DividendError> {
        self.dividends
            .get(id as usize)
            .ok_or(DividendError::InvalidIndex(id))
    }

    pub fn get_mut(&mut self, id: DividendId) -> Result<&mut Dividend, DividendError> {
        self.dividends
            .get_mut(id as usize)
            .ok_or(DividendError::InvalidIndex(id))
    }

    pub fn len(&self) -> usize {
        self.dividends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dividends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dividend> {
        self.dividends.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: PayoutAsset = PayoutAsset::Token(1);

    fn terms() -> DividendTerms {
        DividendTerms {
            snapshot_key: 100,
            ex_date: 90,
            record_date: 90,
            payout_date: 200,
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut registry = DividendRegistry::new();
        assert_eq!(registry.create(terms(), 30, TOKEN), 0);
        assert_eq!(registry.create(terms(), 40, TOKEN), 1);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.get(1).unwrap().total_amount(), 40);
        assert_eq!(registry.get(2).unwrap_err(), DividendError::InvalidIndex(2));
    }

    #[test]
    fn test_status_transitions() {
        let mut registry = DividendRegistry::new();
        let id = registry.create(terms(), 30, TOKEN);
        let expiry_window = 1_000;

        let d = registry.get(id).unwrap();
        assert_eq!(d.status(150, expiry_window), DividendStatus::Scheduled);
        assert_eq!(d.status(200, expiry_window), DividendStatus::Claimable);
        assert_eq!(d.status(1_199, expiry_window), DividendStatus::Claimable);
        assert_eq!(d.status(1_200, expiry_window), DividendStatus::Expired);

        let d = registry.get_mut(id).unwrap();
        d.apply_claim(1, 30).unwrap();
        assert_eq!(d.status(200, expiry_window), DividendStatus::Exhausted);

        d.revert_claim(1, 30);
        let swept = d.apply_recycle();
        assert_eq!(swept, 30);
        assert_eq!(d.status(200, expiry_window), DividendStatus::Recycled);
    }

    #[test]
    fn test_claims_are_booked_once() {
        let mut registry = DividendRegistry::new();
        let id = registry.create(terms(), 30, TOKEN);
        let d = registry.get_mut(id).unwrap();

        d.apply_claim(7, 10).unwrap();
        assert_eq!(d.remaining_amount(), 20);
        assert!(d.has_claimed(7));

        assert_eq!(d.apply_claim(7, 10).unwrap_err(), DividendError::AlreadyClaimed);
        assert_eq!(d.remaining_amount(), 20);
    }

    #[test]
    fn test_claim_exceeding_remaining_rolls_back() {
        let mut registry = DividendRegistry::new();
        let id = registry.create(terms(), 30, TOKEN);
        let d = registry.get_mut(id).unwrap();

        assert!(d.apply_claim(7, 31).is_err());
        assert!(!d.has_claimed(7));
        assert_eq!(d.remaining_amount(), 30);
    }

    #[test]
    fn test_snapshot_supply_captured_once() {
        let mut registry = DividendRegistry::new();
        let id = registry.create(terms(), 30, TOKEN);
        let d = registry.get_mut(id).unwrap();

        assert_eq!(d.snapshot_supply(), 0);
        assert_eq!(d.capture_snapshot_supply(300), 300);
        // A later, different reading does not displace the captured one
        assert_eq!(d.capture_snapshot_supply(999), 300);
        assert_eq!(d.snapshot_supply(), 300);

        // A rollback puts the prior capture back
        d.restore_snapshot_capture(None);
        assert_eq!(d.snapshot_supply(), 0);
        assert_eq!(d.capture_snapshot_supply(600), 600);
    }
}
