//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

use serde::{Deserialize, Serialize};

/// Account ID - globally unique identifier for a holder, the issuer,
/// or a payout destination wallet.
///
/// # Constraints:
/// - **Immutable**: Once assigned, NEVER changes
/// - Primary key into the checkpoint store and claimed sets
///
/// `0` is reserved as the null account (see [`NULL_ACCOUNT`]); it can never
/// hold a balance, claim a dividend, or receive a payout.
pub type AccountId = u64;

/// Asset ID - globally unique identifier for a payout asset.
///
/// `0` is reserved as the null asset (see [`NULL_ASSET`]); deposits
/// denominated in it are rejected.
pub type AssetId = u32;

/// Logical clock key - the time axis for snapshots and payout windows.
///
/// Externally advanced, monotonically non-decreasing (e.g. a block height
/// or sequence counter). The engine never advances it itself.
pub type ClockKey = u64;

/// Dividend ID - assigned sequentially at deposit, starting from 0.
pub type DividendId = u64;

/// The reserved null account. Stands in for the source system's
/// zero address: never a valid holder or payout destination.
pub const NULL_ACCOUNT: AccountId = 0;

/// The reserved null asset.
pub const NULL_ASSET: AssetId = 0;

/// Denomination of a dividend payout: a fungible asset, or the
/// native-currency sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutAsset {
    /// Native currency of the environment (the source system's ether leg).
    Native,
    /// A fungible asset held in custody on the issuer's behalf.
    Token(AssetId),
}

impl PayoutAsset {
    /// A token payout denominated in the null asset is invalid.
    pub fn is_valid(&self) -> bool {
        !matches!(self, PayoutAsset::Token(NULL_ASSET))
    }
}
