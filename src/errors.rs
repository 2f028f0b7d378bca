//! Dividend Error Types
//!
//! Every precondition an operation can violate maps to exactly one variant.
//! All failures are synchronous and non-retryable by the engine; the caller
//! must correct the violated precondition and re-invoke.

use crate::core_types::{ClockKey, DividendId};
use thiserror::Error;

/// Dividend engine error taxonomy
///
/// Operations check preconditions in a fixed order and abort on the first
/// violation with no partial state mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DividendError {
    // === Authorization Errors ===
    #[error("Sender is not issuer")]
    NotIssuer,

    // === Validation Errors ===
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Dividend amount must be greater than zero")]
    ZeroAmount,

    #[error("Attached amount does not match dividend amount")]
    AmountMismatch,

    // === Temporal Errors ===
    #[error("Payout date must be in the future")]
    PayoutNotFuture,

    #[error("Snapshot key must be in the future")]
    SnapshotNotFuture,

    #[error("Too soon")]
    TooSoon,

    #[error("Time lapsed")]
    TimeLapsed,

    // === Funding Errors ===
    #[error("Issuer has not transferred amount")]
    FundsNotTransferred,

    // === State Conflict Errors ===
    #[error("Invalid index: {0}")]
    InvalidIndex(DividendId),

    #[error("Already claimed")]
    AlreadyClaimed,

    #[error("Already recycled")]
    AlreadyRecycled,

    #[error("Nothing to recycle")]
    NothingToRecycle,

    #[error("No dividends owed")]
    NoDividendsOwed,

    // === Store Errors ===
    #[error("Clock regression: attempted key {attempted} is below last recorded key {last}")]
    ClockRegression { attempted: ClockKey, last: ClockKey },

    // === Collaborator Errors ===
    #[error("Outbound transfer failed: {0}")]
    TransferFailed(String),
}
