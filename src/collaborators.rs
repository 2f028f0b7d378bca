//! External collaborator capabilities
//!
//! The distribution engine never checks roles, moves funds, or tells time
//! by itself; those live behind the environment and are injected as
//! capability traits. Production wires real implementations; tests inject
//! doubles.

use crate::core_types::{AccountId, ClockKey, PayoutAsset};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Failure reported by the asset-transfer collaborator.
///
/// The engine maps this to `DividendError::TransferFailed` and rolls back
/// the state mutation of the operation that triggered the transfer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    #[error("Destination rejected the transfer")]
    DestinationRejected,
    #[error("Custodian holds insufficient funds")]
    InsufficientCustody,
    #[error("Transfer failed: {0}")]
    Other(String),
}

/// Role checks. Wraps the environment's operator/role registry.
pub trait Authorizer: Debug {
    /// Whether `caller` is the registered issuer.
    fn is_issuer(&self, caller: AccountId) -> bool;
}

/// Custody and outbound payouts.
pub trait TransferAgent: Debug {
    /// Transfer `amount` of `asset` from custody to `destination`.
    ///
    /// Called only after the caller has fully booked the payout; on failure
    /// the caller reverts its booking.
    fn transfer_out(
        &mut self,
        asset: PayoutAsset,
        amount: u64,
        destination: AccountId,
    ) -> Result<(), TransferFailure>;

    /// Amount of `asset` the custodian currently holds, committed or not.
    fn held_balance(&self, asset: PayoutAsset) -> u64;
}

/// Externally advanced, monotonically non-decreasing logical time.
pub trait LogicalClock: Debug {
    fn now(&self) -> ClockKey;
}

/// Authorizer with a single fixed issuer account.
#[derive(Debug, Clone)]
pub struct SingleIssuer {
    issuer: AccountId,
}

impl SingleIssuer {
    pub fn new(issuer: AccountId) -> Self {
        Self { issuer }
    }
}

impl Authorizer for SingleIssuer {
    fn is_issuer(&self, caller: AccountId) -> bool {
        caller == self.issuer
    }
}

/// In-memory custodian: tracks funds held in custody per asset and credits
/// outbound transfers to per-account balances. Used by the demo binary and
/// as the test double for the asset-transfer collaborator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustodian {
    held: FxHashMap<PayoutAsset, u64>,
    received: FxHashMap<(AccountId, PayoutAsset), u64>,
    blocked: FxHashSet<AccountId>,
}

impl InMemoryCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `amount` of `asset` into custody (the issuer pre-funding a
    /// deposit, or native value arriving attached to a call). Saturates at
    /// `u64::MAX` rather than overflowing.
    pub fn fund(&mut self, asset: PayoutAsset, amount: u64) {
        let held = self.held.entry(asset).or_insert(0);
        *held = held.saturating_add(amount);
    }

    /// Total `asset` credited to `account` by outbound transfers.
    pub fn received_by(&self, account: AccountId, asset: PayoutAsset) -> u64 {
        self.received.get(&(account, asset)).copied().unwrap_or(0)
    }

    /// Make every transfer to `account` fail with `DestinationRejected`.
    pub fn block(&mut self, account: AccountId) {
        self.blocked.insert(account);
    }

    pub fn unblock(&mut self, account: AccountId) {
        self.blocked.remove(&account);
    }
}

impl TransferAgent for InMemoryCustodian {
    fn transfer_out(
        &mut self,
        asset: PayoutAsset,
        amount: u64,
        destination: AccountId,
    ) -> Result<(), TransferFailure> {
        if self.blocked.contains(&destination) {
            return Err(TransferFailure::DestinationRejected);
        }
        let held = self.held.entry(asset).or_insert(0);
        if *held < amount {
            return Err(TransferFailure::InsufficientCustody);
        }
        *held -= amount;
        *self.received.entry((destination, asset)).or_insert(0) += amount;
        Ok(())
    }

    fn held_balance(&self, asset: PayoutAsset) -> u64 {
        self.held.get(&asset).copied().unwrap_or(0)
    }
}

/// Hand-advanced clock. Shared via `Clone`, so a harness can keep one handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now: ClockKey) -> Self {
        let clock = Self::default();
        clock.set(now);
        clock
    }

    /// Move the clock to `now`. Never rewinds.
    pub fn set(&self, now: ClockKey) {
        self.now.fetch_max(now, Ordering::SeqCst);
    }

    pub fn advance(&self, units: ClockKey) {
        self.now.fetch_add(units, Ordering::SeqCst);
    }
}

impl LogicalClock for ManualClock {
    fn now(&self) -> ClockKey {
        self.now.load(Ordering::SeqCst)
    }
}
