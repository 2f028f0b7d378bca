//! Checkpoint Store - versioned balance history
//!
//! Answers "what was subject X's balance (and the total supply) at logical
//! time T" for arbitrary past T. The external balance ledger writes a
//! checkpoint for every affected subject, including the aggregate total, in
//! the same atomic unit as each balance mutation; the distribution engine
//! only ever reads.
//!
//! # Storage
//!
//! Per subject, an ordered `Vec<Checkpoint>` strictly increasing in clock
//! key. A second write at the subject's latest key overwrites the value in
//! place instead of appending, so sequence size is proportional to the
//! number of distinct instants the value changed at, not the number of
//! writes (batch operations inside one instant collapse to one entry).
//!
//! # Lookup
//!
//! `value_at` binary-searches for the latest checkpoint with key <= the
//! queried key: O(log n) in the subject's checkpoint count, never mutates.

use crate::core_types::{AccountId, ClockKey};
use crate::errors::DividendError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A checkpointed subject: one account, or the aggregate total supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Account(AccountId),
    TotalSupply,
}

/// A recorded `(clock key, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub clock_key: ClockKey,
    pub value: u64,
}

/// Append-or-compact checkpoint sequences for all subjects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointStore {
    accounts: FxHashMap<AccountId, Vec<Checkpoint>>,
    total_supply: Vec<Checkpoint>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `subject` as of `clock_key`.
    ///
    /// Appends if `clock_key` exceeds the subject's last recorded key,
    /// overwrites the last value in place if it equals it.
    ///
    /// # Errors
    /// `ClockRegression` if `clock_key` is below the last recorded key.
    /// The caller must write with non-decreasing keys per subject.
    pub fn record(
        &mut self,
        subject: Subject,
        clock_key: ClockKey,
        value: u64,
    ) -> Result<(), DividendError> {
        let seq = match subject {
            Subject::Account(account) => self.accounts.entry(account).or_default(),
            Subject::TotalSupply => &mut self.total_supply,
        };

        if let Some(last) = seq.last_mut() {
            if clock_key < last.clock_key {
                return Err(DividendError::ClockRegression {
                    attempted: clock_key,
                    last: last.clock_key,
                });
            }
            if clock_key == last.clock_key {
                // Same-instant rewrite: compact instead of appending
                last.value = value;
                return Ok(());
            }
        }

        seq.push(Checkpoint { clock_key, value });
        Ok(())
    }

    /// Effective value of `subject` as of `clock_key`: the value of the
    /// latest checkpoint with key <= `clock_key`, or zero if none exists.
    /// Never-seen subjects have zero value at all times.
    pub fn value_at(&self, subject: Subject, clock_key: ClockKey) -> u64 {
        let seq = self.sequence(subject);
        let idx = seq.partition_point(|c| c.clock_key <= clock_key);
        if idx == 0 { 0 } else { seq[idx - 1].value }
    }

    /// Current value of `subject`: the last recorded value, or zero.
    pub fn current_value(&self, subject: Subject) -> u64 {
        self.sequence(subject).last().map_or(0, |c| c.value)
    }

    /// Number of stored checkpoints for `subject`.
    pub fn checkpoint_count(&self, subject: Subject) -> usize {
        self.sequence(subject).len()
    }

    fn sequence(&self, subject: Subject) -> &[Checkpoint] {
        match subject {
            Subject::Account(account) => {
                self.accounts.get(&account).map_or(&[], Vec::as_slice)
            }
            Subject::TotalSupply => &self.total_supply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Subject = Subject::Account(1);

    #[test]
    fn test_never_seen_subject_is_zero() {
        let store = CheckpointStore::new();
        assert_eq!(store.value_at(ALICE, 0), 0);
        assert_eq!(store.value_at(ALICE, u64::MAX), 0);
        assert_eq!(store.current_value(ALICE), 0);
    }

    #[test]
    fn test_value_at_boundaries() {
        let mut store = CheckpointStore::new();
        store.record(ALICE, 10, 100).unwrap();
        store.record(ALICE, 20, 250).unwrap();
        store.record(ALICE, 30, 50).unwrap();

        // Before the first checkpoint: zero
        assert_eq!(store.value_at(ALICE, 9), 0);
        // Exactly at a checkpoint: that checkpoint's value
        assert_eq!(store.value_at(ALICE, 10), 100);
        assert_eq!(store.value_at(ALICE, 20), 250);
        // Between checkpoints: the earlier one
        assert_eq!(store.value_at(ALICE, 29), 250);
        // At or after the last: the last recorded value
        assert_eq!(store.value_at(ALICE, 30), 50);
        assert_eq!(store.value_at(ALICE, u64::MAX), 50);
        assert_eq!(store.current_value(ALICE), 50);
    }

    #[test]
    fn test_same_key_write_compacts_in_place() {
        let mut store = CheckpointStore::new();
        store.record(ALICE, 5, 10).unwrap();
        store.record(ALICE, 5, 20).unwrap();
        store.record(ALICE, 5, 30).unwrap();

        assert_eq!(store.checkpoint_count(ALICE), 1);
        assert_eq!(store.value_at(ALICE, 5), 30);
        assert_eq!(store.value_at(ALICE, 4), 0);
    }

    #[test]
    fn test_clock_regression_rejected() {
        let mut store = CheckpointStore::new();
        store.record(ALICE, 10, 100).unwrap();

        let err = store.record(ALICE, 9, 200).unwrap_err();
        assert_eq!(
            err,
            DividendError::ClockRegression {
                attempted: 9,
                last: 10
            }
        );
        // Failed write left nothing behind
        assert_eq!(store.checkpoint_count(ALICE), 1);
        assert_eq!(store.current_value(ALICE), 100);
    }

    #[test]
    fn test_subjects_are_independent() {
        let mut store = CheckpointStore::new();
        store.record(Subject::Account(1), 10, 100).unwrap();
        store.record(Subject::Account(2), 5, 7).unwrap();
        store.record(Subject::TotalSupply, 10, 107).unwrap();

        // Account 2's key 5 is older than account 1's key 10 - no conflict
        store.record(Subject::Account(2), 6, 8).unwrap();

        assert_eq!(store.value_at(Subject::Account(1), 10), 100);
        assert_eq!(store.value_at(Subject::Account(2), 10), 8);
        assert_eq!(store.value_at(Subject::TotalSupply, 10), 107);
    }
}
