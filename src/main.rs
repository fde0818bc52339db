#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use payout_ledger::{
    config::{database, settings},
    core::{
        dashboard::{self, Period},
        expense, partner, recalc,
    },
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: payout-ledger [recalc-all | summary <owner_id> | run-rate <owner_id> <period>]";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let display_currency = app_config.display_currency()?;

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed configured partners
    partner::seed_partners(&db, &app_config.partners).await?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["recalc-all"] => {
            // Per-project failures are already logged by the batch.
            recalc::recalculate_all(&db).await?;
        }
        ["summary", owner_id] => {
            let summary = dashboard::portfolio_summary(&db, owner_id, display_currency).await?;
            info!(
                owner_id = %owner_id,
                currency = %summary.currency,
                projects = summary.project_count,
                revenue = summary.total_revenue,
                final_amount = summary.total_final_amount,
                partner_payouts = summary.total_partner_payouts,
                withdrawals = summary.total_withdrawals,
                balance = summary.balance,
                "Portfolio summary"
            );
        }
        ["run-rate", owner_id, period] => {
            let period: Period = period.parse()?;
            let expenses = expense::get_expenses_for_owner(&db, owner_id).await?;
            let total = dashboard::expense_run_rate(&expenses, period, display_currency);
            info!(
                owner_id = %owner_id,
                period = %period,
                currency = %display_currency,
                total,
                "Expense run-rate"
            );
        }
        _ => {
            return Err(Error::Config {
                message: USAGE.to_string(),
            });
        }
    }

    Ok(())
}
