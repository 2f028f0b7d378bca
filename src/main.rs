//! Demo binary: runs a full dividend lifecycle against the reference
//! balance ledger with tracing output.

use anyhow::Result;
use dividend_engine::config::AppConfig;
use dividend_engine::logging::init_logging;
use dividend_engine::{
    BalanceLedger, DistributionEngine, DividendTerms, InMemoryCustodian, LogicalClock, ManualClock,
    PayoutAsset, SingleIssuer,
};
use tracing::info;

const ISSUER: u64 = 1;
const INVESTORS: [u64; 3] = [11, 12, 13];
const PAYOUT_ASSET: u32 = 7;

fn main() -> Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "default".to_string());
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    let clock = ManualClock::new(100);
    let mut ledger = BalanceLedger::new();
    let mut custodian = InMemoryCustodian::new();

    // Holders: 100 units each, minted in one instant
    for investor in INVESTORS {
        ledger.mint(clock.now(), investor, 100)?;
    }
    // Issuer pre-funds custody with the payout amount
    custodian.fund(PayoutAsset::Token(PAYOUT_ASSET), 300);

    let mut engine = DistributionEngine::new(
        config.dividend.wallet,
        config.dividend.expiry_window,
        SingleIssuer::new(ISSUER),
        custodian,
        clock.clone(),
    )?;

    let terms = DividendTerms {
        snapshot_key: 200,
        ex_date: 150,
        record_date: 150,
        payout_date: 300,
    };
    let id = engine.deposit_token_dividend(ISSUER, terms, 300, PAYOUT_ASSET)?;
    info!(id, "deposited");

    // Snapshot passes, payout window opens
    clock.set(300);
    for investor in INVESTORS.iter().take(2) {
        let share = engine.claim_dividend(ledger.checkpoints(), id, *investor)?;
        info!(investor, share, "claimed");
    }

    // One holder never claims; sweep their share after the window
    clock.set(terms.payout_date + engine.expiry_window());
    let swept = engine.recycle_dividend(ISSUER, id)?;
    info!(swept, wallet = engine.wallet(), "recycled");

    for event in engine.drain_events() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
