//! Shared test utilities for `PayoutLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        currency::Currency,
        expense::{self, NewExpense},
        partner,
        project::{self, NewProject},
    },
    entities::{
        self,
        expense::{Cadence, ExpenseStatus},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Owner id used by every test helper.
pub const TEST_OWNER: &str = "test_owner";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test project with charity disabled.
///
/// # Defaults
/// * `owner_id`: [`TEST_OWNER`]
/// * `name`: "Test Project"
/// * `charity_enabled`: false
pub async fn create_test_project(
    db: &DatabaseConnection,
    price: f64,
    currency: Currency,
    fee_percent: f64,
) -> Result<entities::project::Model> {
    create_custom_project(db, price, currency, fee_percent, false).await
}

/// Creates a test project with an explicit charity flag.
pub async fn create_custom_project(
    db: &DatabaseConnection,
    price: f64,
    currency: Currency,
    fee_percent: f64,
    charity_enabled: bool,
) -> Result<entities::project::Model> {
    project::create_project(
        db,
        NewProject {
            owner_id: TEST_OWNER.to_string(),
            name: "Test Project".to_string(),
            price,
            currency,
            fee_percent,
            charity_enabled,
        },
    )
    .await
}

/// Creates an active one-time test expense linked to `project_ids`.
///
/// # Defaults
/// * `cadence`: one-time
/// * `status`: Active
/// * `category`: "software"
pub async fn create_test_expense(
    db: &DatabaseConnection,
    amount: f64,
    currency: Currency,
    project_ids: &[&str],
) -> Result<entities::expense::Model> {
    create_custom_expense(
        db,
        amount,
        currency,
        Cadence::OneTime,
        ExpenseStatus::Active,
        project_ids,
    )
    .await
}

/// Creates a test expense with custom cadence and status.
pub async fn create_custom_expense(
    db: &DatabaseConnection,
    amount: f64,
    currency: Currency,
    cadence: Cadence,
    status: ExpenseStatus,
    project_ids: &[&str],
) -> Result<entities::expense::Model> {
    let change = expense::create_expense(
        db,
        NewExpense {
            owner_id: TEST_OWNER.to_string(),
            amount,
            currency,
            cadence,
            status,
            category: "software".to_string(),
            project_ids: project_ids.iter().map(ToString::to_string).collect(),
        },
    )
    .await?;
    Ok(change.expense)
}

/// Creates a partner with a generated id.
pub async fn create_test_partner(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::partner::Model> {
    partner::create_partner(db, name.to_string(), None).await
}

/// Builds an unsaved project model with zeroed derived fields, for mock databases.
#[must_use]
pub fn sample_project_model(id: &str, price: f64, fee_percent: f64) -> entities::project::Model {
    let now = chrono::Utc::now();
    entities::project::Model {
        id: id.to_string(),
        owner_id: TEST_OWNER.to_string(),
        name: "Mock Project".to_string(),
        price,
        currency: Currency::Dollars,
        fee_percent,
        charity_enabled: false,
        platform_fee_amount: 0.0,
        after_platform_fee: 0.0,
        allocated_expenses: 0.0,
        after_expenses: 0.0,
        charity_amount: 0.0,
        after_charity: 0.0,
        final_amount: 0.0,
        partner_share_amount: 0.0,
        created_at: now,
        updated_at: now,
    }
}

/// Sets up a database with one 1000-dollar project at a 20% fee.
/// Returns (db, project) for common test scenarios.
pub async fn setup_with_project() -> Result<(DatabaseConnection, entities::project::Model)> {
    let db = setup_test_db().await?;
    let project = create_test_project(&db, 1000.0, Currency::Dollars, 20.0).await?;
    Ok((db, project))
}
