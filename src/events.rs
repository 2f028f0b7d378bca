//! Lifecycle events emitted by the distribution engine
//!
//! Every successful mutating operation queues one event. Callers drain the
//! queue to drive notifications, audit trails, or downstream bookkeeping;
//! the engine itself never consumes them.

use crate::core_types::{AccountId, ClockKey, DividendId, PayoutAsset};
use serde::{Deserialize, Serialize};

/// Emitted by deposit, claim, recycle and wallet updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DividendEvent {
    /// A new dividend was deposited and escrowed.
    Deposited {
        id: DividendId,
        snapshot_key: ClockKey,
        payout_date: ClockKey,
        amount: u64,
        asset: PayoutAsset,
    },

    /// A holder claimed their pro-rata share.
    Claimed {
        id: DividendId,
        claimant: AccountId,
        amount: u64,
        asset: PayoutAsset,
    },

    /// Unclaimed residue was swept back to the wallet.
    Recycled {
        id: DividendId,
        wallet: AccountId,
        amount: u64,
        asset: PayoutAsset,
    },

    /// The payout-destination wallet for future recycles changed.
    WalletUpdated {
        previous: AccountId,
        wallet: AccountId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_round_trip_as_json() {
        let event = DividendEvent::Claimed {
            id: 3,
            claimant: 42,
            amount: 100,
            asset: PayoutAsset::Token(7),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: DividendEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
