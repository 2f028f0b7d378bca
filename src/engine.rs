//! Distribution Engine - deposit / claim / recycle orchestration
//!
//! Wires the dividend registry, the escrow ledger and the (read-only)
//! checkpoint store together behind four mutating operations, with role
//! checks, fund custody and time delegated to injected collaborators.
//!
//! # Atomicity
//!
//! The engine serializes mutating operations through exclusive ownership:
//! every operation takes `&mut self` and completes fully before the next
//! begins. Each operation checks all preconditions first, then mutates its
//! own state, and only then performs the external transfer; a failed
//! transfer rolls the mutation back so callers never observe a partial
//! operation.
//!
//! The checkpoint store is owned by the external balance ledger and is
//! borrowed per operation, so historical reads stay lock-free for any
//! number of concurrent readers.

use crate::checkpoint::{CheckpointStore, Subject};
use crate::collaborators::{Authorizer, LogicalClock, TransferAgent};
use crate::core_types::{AccountId, AssetId, ClockKey, DividendId, NULL_ACCOUNT, PayoutAsset};
use crate::dividend::{Dividend, DividendRegistry, DividendStatus, DividendTerms};
use crate::errors::DividendError;
use crate::escrow::EscrowLedger;
use crate::events::DividendEvent;
use tracing::info;

/// The dividend lifecycle engine.
///
/// Owns all dividend records and the escrow ledger; everything else is an
/// injected capability.
#[derive(Debug)]
pub struct DistributionEngine<A, T, C>
where
    A: Authorizer,
    T: TransferAgent,
    C: LogicalClock,
{
    registry: DividendRegistry,
    escrow: EscrowLedger,
    /// Destination for recycled residue. Claims never pay here.
    wallet: AccountId,
    expiry_window: ClockKey,
    authorizer: A,
    custodian: T,
    clock: C,
    events: Vec<DividendEvent>,
}

impl<A, T, C> DistributionEngine<A, T, C>
where
    A: Authorizer,
    T: TransferAgent,
    C: LogicalClock,
{
    /// Create an engine paying recycled residue to `wallet`.
    ///
    /// # Errors
    /// `InvalidAddress` if `wallet` is the null account.
    pub fn new(
        wallet: AccountId,
        expiry_window: ClockKey,
        authorizer: A,
        custodian: T,
        clock: C,
    ) -> Result<Self, DividendError> {
        if wallet == NULL_ACCOUNT {
            return Err(DividendError::InvalidAddress);
        }
        Ok(Self {
            registry: DividendRegistry::new(),
            escrow: EscrowLedger::new(),
            wallet,
            expiry_window,
            authorizer,
            custodian,
            clock,
            events: Vec::new(),
        })
    }

    // ============================================================
    // DEPOSIT
    // ============================================================

    /// Deposit a dividend denominated in a fungible asset.
    ///
    /// Never moves funds itself: the issuer must have pre-transferred
    /// `amount` into custody, and this only books that pre-existing custody
    /// (actual holdings minus escrow already committed) against the new
    /// obligation.
    pub fn deposit_token_dividend(
        &mut self,
        caller: AccountId,
        terms: DividendTerms,
        amount: u64,
        asset: AssetId,
    ) -> Result<DividendId, DividendError> {
        self.require_issuer(caller)?;
        let payout_asset = PayoutAsset::Token(asset);
        if !payout_asset.is_valid() {
            return Err(DividendError::InvalidAddress);
        }
        self.validate_terms(terms, amount)?;

        let free = self
            .custodian
            .held_balance(payout_asset)
            .saturating_sub(self.escrow.balance(payout_asset));
        if free < amount {
            return Err(DividendError::FundsNotTransferred);
        }

        self.store_dividend(terms, amount, payout_asset)
    }

    /// Deposit a dividend denominated in the native currency.
    ///
    /// The call must carry exactly `amount` (`attached`); the environment
    /// places attached value into custody atomically with the call.
    pub fn deposit_native_dividend(
        &mut self,
        caller: AccountId,
        terms: DividendTerms,
        amount: u64,
        attached: u64,
    ) -> Result<DividendId, DividendError> {
        self.require_issuer(caller)?;
        self.validate_terms(terms, amount)?;
        if attached != amount {
            return Err(DividendError::AmountMismatch);
        }

        self.store_dividend(terms, amount, PayoutAsset::Native)
    }

    // ============================================================
    // CLAIM
    // ============================================================

    /// Pay `claimant` their pro-rata share of dividend `id`.
    ///
    /// `share = floor(balance_at_snapshot * total / supply_at_snapshot)`,
    /// with balance and supply read from the checkpoint store at the
    /// dividend's snapshot key. Claims are deferred until the snapshot
    /// instant has passed, so the store reading is final; the denominator
    /// is captured by the first successful claim and reused for every later
    /// one.
    ///
    /// Returns the paid share.
    pub fn claim_dividend(
        &mut self,
        store: &CheckpointStore,
        id: DividendId,
        claimant: AccountId,
    ) -> Result<u64, DividendError> {
        let now = self.clock.now();
        let expiry_window = self.expiry_window;

        let dividend = self.registry.get(id)?;
        if dividend.recycled() {
            return Err(DividendError::AlreadyRecycled);
        }
        if now < dividend.payout_date() {
            return Err(DividendError::TooSoon);
        }
        // The payout date may precede the snapshot key; shares are not
        // computable until the snapshot instant has arrived
        if now < dividend.snapshot_key() {
            return Err(DividendError::TooSoon);
        }
        if now >= dividend.expiry(expiry_window) {
            return Err(DividendError::TimeLapsed);
        }
        if dividend.has_claimed(claimant) {
            return Err(DividendError::AlreadyClaimed);
        }

        let snapshot_key = dividend.snapshot_key();
        let total = dividend.total_amount();
        let asset = dividend.payout_asset();
        let prior_capture = dividend.snapshot_capture();
        let balance = store.value_at(Subject::Account(claimant), snapshot_key);
        let supply = prior_capture
            .unwrap_or_else(|| store.value_at(Subject::TotalSupply, snapshot_key));
        if supply == 0 {
            return Err(DividendError::NoDividendsOwed);
        }
        // Floor division; the residue stays behind for recycling
        let share = (u128::from(balance) * u128::from(total) / u128::from(supply)) as u64;
        if share == 0 {
            return Err(DividendError::NoDividendsOwed);
        }

        // Effects before the external transfer. The capture happens here, on
        // the success path only: a rejected claim leaves no visible state.
        let dividend = self.registry.get_mut(id)?;
        dividend.capture_snapshot_supply(supply);
        if let Err(e) = dividend.apply_claim(claimant, share) {
            dividend.restore_snapshot_capture(prior_capture);
            return Err(e);
        }
        if let Err(e) = self.escrow.release(asset, share) {
            let dividend = self.registry.get_mut(id)?;
            dividend.revert_claim(claimant, share);
            dividend.restore_snapshot_capture(prior_capture);
            return Err(e);
        }

        if let Err(failure) = self.custodian.transfer_out(asset, share, claimant) {
            self.escrow.commit(asset, share)?;
            let dividend = self.registry.get_mut(id)?;
            dividend.revert_claim(claimant, share);
            dividend.restore_snapshot_capture(prior_capture);
            return Err(DividendError::TransferFailed(failure.to_string()));
        }

        info!(id, claimant, share, ?asset, "dividend claimed");
        self.events.push(DividendEvent::Claimed {
            id,
            claimant,
            amount: share,
            asset,
        });
        Ok(share)
    }

    // ============================================================
    // RECYCLE
    // ============================================================

    /// Sweep the unclaimed residue of dividend `id` back to the wallet.
    ///
    /// Only the issuer, only once the expiry window has elapsed, and only
    /// while something is left to sweep. Returns the swept amount.
    pub fn recycle_dividend(
        &mut self,
        caller: AccountId,
        id: DividendId,
    ) -> Result<u64, DividendError> {
        let now = self.clock.now();
        let expiry_window = self.expiry_window;

        let dividend = self.registry.get(id)?;
        self.require_issuer(caller)?;
        if now < dividend.expiry(expiry_window) {
            return Err(DividendError::TooSoon);
        }
        if dividend.recycled() {
            return Err(DividendError::AlreadyRecycled);
        }
        if dividend.remaining_amount() == 0 {
            return Err(DividendError::NothingToRecycle);
        }

        let asset = dividend.payout_asset();
        let swept = self.registry.get_mut(id)?.apply_recycle();
        if let Err(e) = self.escrow.release(asset, swept) {
            self.registry.get_mut(id)?.revert_recycle(swept);
            return Err(e);
        }

        let wallet = self.wallet;
        if let Err(failure) = self.custodian.transfer_out(asset, swept, wallet) {
            self.escrow.commit(asset, swept)?;
            self.registry.get_mut(id)?.revert_recycle(swept);
            return Err(DividendError::TransferFailed(failure.to_string()));
        }

        info!(id, wallet, swept, ?asset, "dividend recycled");
        self.events.push(DividendEvent::Recycled {
            id,
            wallet,
            amount: swept,
            asset,
        });
        Ok(swept)
    }

    // ============================================================
    // WALLET
    // ============================================================

    /// Replace the payout-destination wallet used by future recycles.
    /// Pending claims are unaffected; they always pay the claimant.
    pub fn update_wallet(
        &mut self,
        caller: AccountId,
        wallet: AccountId,
    ) -> Result<(), DividendError> {
        self.require_issuer(caller)?;
        if wallet == NULL_ACCOUNT {
            return Err(DividendError::InvalidAddress);
        }

        let previous = self.wallet;
        self.wallet = wallet;
        info!(previous, wallet, "payout wallet updated");
        self.events.push(DividendEvent::WalletUpdated { previous, wallet });
        Ok(())
    }

    // ============================================================
    // READ ACCESSORS
    // ============================================================

    /// Full record for dividend `id`.
    pub fn get_dividend(&self, id: DividendId) -> Result<&Dividend, DividendError> {
        self.registry.get(id)
    }

    /// Lifecycle position of dividend `id` at the current logical time.
    pub fn dividend_status(&self, id: DividendId) -> Result<DividendStatus, DividendError> {
        Ok(self
            .registry
            .get(id)?
            .status(self.clock.now(), self.expiry_window))
    }

    /// Funds committed across all non-recycled dividends in `asset`.
    pub fn escrow_balance(&self, asset: PayoutAsset) -> u64 {
        self.escrow.balance(asset)
    }

    pub fn wallet(&self) -> AccountId {
        self.wallet
    }

    pub fn expiry_window(&self) -> ClockKey {
        self.expiry_window
    }

    pub fn dividend_count(&self) -> usize {
        self.registry.len()
    }

    pub fn custodian(&self) -> &T {
        &self.custodian
    }

    pub fn custodian_mut(&mut self) -> &mut T {
        &mut self.custodian
    }

    /// Take all queued lifecycle events.
    pub fn drain_events(&mut self) -> Vec<DividendEvent> {
        std::mem::take(&mut self.events)
    }

    // ============================================================
    // INTERNALS
    // ============================================================

    fn require_issuer(&self, caller: AccountId) -> Result<(), DividendError> {
        if !self.authorizer.is_issuer(caller) {
            return Err(DividendError::NotIssuer);
        }
        Ok(())
    }

    fn validate_terms(&self, terms: DividendTerms, amount: u64) -> Result<(), DividendError> {
        if amount == 0 {
            return Err(DividendError::ZeroAmount);
        }
        let now = self.clock.now();
        if terms.payout_date <= now {
            return Err(DividendError::PayoutNotFuture);
        }
        if terms.snapshot_key <= now {
            return Err(DividendError::SnapshotNotFuture);
        }
        Ok(())
    }

    fn store_dividend(
        &mut self,
        terms: DividendTerms,
        amount: u64,
        asset: PayoutAsset,
    ) -> Result<DividendId, DividendError> {
        self.escrow.commit(asset, amount)?;
        let id = self.registry.create(terms, amount, asset);

        info!(
            id,
            amount,
            ?asset,
            snapshot_key = terms.snapshot_key,
            payout_date = terms.payout_date,
            "dividend deposited"
        );
        self.events.push(DividendEvent::Deposited {
            id,
            snapshot_key: terms.snapshot_key,
            payout_date: terms.payout_date,
            amount,
            asset,
        });
        Ok(id)
    }
}
