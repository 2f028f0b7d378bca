//! Balance Ledger - the checkpoint-writing balance collaborator
//!
//! Reference implementation of the external ledger the distribution engine
//! reads through. Tracks live balances and the total supply, and writes a
//! checkpoint for every affected subject, including the aggregate total, in
//! the same atomic unit as each mint/burn/transfer.
//!
//! The ledger is the sole writer of its checkpoint store; all writes pass
//! one monotonic clock gate, so per-subject key order can never regress.

use crate::checkpoint::{CheckpointStore, Subject};
use crate::core_types::{AccountId, ClockKey, NULL_ACCOUNT};
use crate::errors::DividendError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ledger mutation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Balance overflow")]
    Overflow,

    #[error("Null account cannot hold a balance")]
    NullAccount,

    #[error(transparent)]
    Checkpoint(#[from] DividendError),
}

/// Live balances plus their full checkpoint history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceLedger {
    store: CheckpointStore,
    balances: FxHashMap<AccountId, u64>,
    total_supply: u64,
    last_clock: ClockKey,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the checkpoint history, for the engine to borrow.
    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn balance_of(&self, account: AccountId) -> u64 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// `account`'s balance as of `clock_key`.
    pub fn balance_of_at(&self, account: AccountId, clock_key: ClockKey) -> u64 {
        self.store.value_at(Subject::Account(account), clock_key)
    }

    /// Total supply as of `clock_key`.
    pub fn total_supply_at(&self, clock_key: ClockKey) -> u64 {
        self.store.value_at(Subject::TotalSupply, clock_key)
    }

    /// Create `amount` units on `account` as of `now`.
    pub fn mint(
        &mut self,
        now: ClockKey,
        account: AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.gate_clock(now)?;
        if account == NULL_ACCOUNT {
            return Err(LedgerError::NullAccount);
        }
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(account, balance);
        self.total_supply = supply;
        self.store.record(Subject::Account(account), now, balance)?;
        self.store.record(Subject::TotalSupply, now, supply)?;
        Ok(())
    }

    /// Destroy `amount` units held by `account` as of `now`.
    pub fn burn(
        &mut self,
        now: ClockKey,
        account: AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.gate_clock(now)?;
        let balance = self
            .balance_of(account)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;

        self.balances.insert(account, balance);
        self.total_supply = supply;
        self.store.record(Subject::Account(account), now, balance)?;
        self.store.record(Subject::TotalSupply, now, supply)?;
        Ok(())
    }

    /// Move `amount` units from `from` to `to` as of `now`.
    /// The aggregate total is unaffected, so no supply checkpoint is written.
    pub fn transfer(
        &mut self,
        now: ClockKey,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.gate_clock(now)?;
        if to == NULL_ACCOUNT {
            return Err(LedgerError::NullAccount);
        }
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        self.store.record(Subject::Account(from), now, from_balance)?;
        self.store.record(Subject::Account(to), now, to_balance)?;
        Ok(())
    }

    /// All writes go through one clock; rejecting rewinds here keeps every
    /// per-subject sequence monotonic before any state is touched.
    fn gate_clock(&mut self, now: ClockKey) -> Result<(), LedgerError> {
        if now < self.last_clock {
            return Err(LedgerError::Checkpoint(DividendError::ClockRegression {
                attempted: now,
                last: self.last_clock,
            }));
        }
        self.last_clock = now;
        Ok(())
    }
}
