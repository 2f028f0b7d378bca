//! Dividend Engine - checkpointed pro-rata dividend distribution
//!
//! Distributes periodic payouts to holders of a fungible ledger asset,
//! proportionally to each holder's balance at a scheduled snapshot, and
//! reclaims unclaimed funds after an expiry window.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (AccountId, ClockKey, etc.)
//! - [`checkpoint`] - Versioned balance history with point-in-time reads
//! - [`escrow`] - Per-asset funds committed to outstanding dividends
//! - [`dividend`] - Dividend records, registry, and lifecycle states
//! - [`engine`] - Deposit / claim / recycle / wallet orchestration
//! - [`collaborators`] - Injected capabilities (roles, custody, clock)
//! - [`events`] - Lifecycle events queued by the engine
//! - [`ledger`] - Reference checkpoint-writing balance ledger
//! - [`errors`] - The full failure taxonomy

// Core types - must be first!
pub mod core_types;

// Distribution components
pub mod checkpoint;
pub mod collaborators;
pub mod dividend;
pub mod engine;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod ledger;

// Runtime plumbing
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use checkpoint::{Checkpoint, CheckpointStore, Subject};
pub use collaborators::{
    Authorizer, InMemoryCustodian, LogicalClock, ManualClock, SingleIssuer, TransferAgent,
    TransferFailure,
};
pub use core_types::{
    AccountId, AssetId, ClockKey, DividendId, NULL_ACCOUNT, NULL_ASSET, PayoutAsset,
};
pub use dividend::{
    DEFAULT_EXPIRY_WINDOW, Dividend, DividendRegistry, DividendStatus, DividendTerms,
};
pub use engine::DistributionEngine;
pub use errors::DividendError;
pub use escrow::EscrowLedger;
pub use events::DividendEvent;
pub use ledger::{BalanceLedger, LedgerError};
