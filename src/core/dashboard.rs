//! Portfolio dashboard aggregation.
//!
//! Everything here is display-side. Cadence normalization only exists in this
//! module: per-project allocation always uses the raw stored expense amount, while
//! run-rates spread recurring costs over a reporting period. All totals are
//! converted through the same rate table the per-project engine uses.

use crate::{
    core::{
        currency::{Currency, convert},
        expense::get_expenses_for_owner,
        project, withdrawal,
    },
    entities::expense::{self, Cadence, ExpenseStatus},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Reporting window for run-rate figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// One week, 12/52 of a month
    Weekly,
    /// One calendar month
    Monthly,
    /// Three months
    Quarterly,
    /// Twelve months
    Annual,
}

impl Period {
    /// Length of the period in months.
    #[must_use]
    pub const fn months(self) -> f64 {
        match self {
            Self::Weekly => 12.0 / 52.0,
            Self::Monthly => 1.0,
            Self::Quarterly => 3.0,
            Self::Annual => 12.0,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        })
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            "annual" | "yearly" | "year" => Ok(Self::Annual),
            _ => Err(Error::UnknownPeriod {
                value: s.to_string(),
            }),
        }
    }
}

/// Months covered by one billing cycle. `None` for one-time expenses.
const fn cycle_months(cadence: Cadence) -> Option<f64> {
    match cadence {
        Cadence::Monthly => Some(1.0),
        Cadence::Quarterly => Some(3.0),
        Cadence::BiAnnual => Some(6.0),
        Cadence::Yearly => Some(12.0),
        Cadence::OneTime => None,
    }
}

/// Spreads a stored expense amount over `period`.
///
/// Recurring amounts are reduced to a monthly equivalent and scaled to the period
/// length, so a 1200 yearly expense is 100 monthly and 300 quarterly. One-time
/// amounts are reported in full whatever the period.
#[must_use]
pub fn normalized_amount(amount: f64, cadence: Cadence, period: Period) -> f64 {
    cycle_months(cadence).map_or(amount, |months| amount / months * period.months())
}

/// Whether an expense contributes to dashboard run-rates.
///
/// Completed expenses count here even though they are no longer allocated to
/// projects.
#[must_use]
pub const fn counts_toward_run_rate(status: ExpenseStatus) -> bool {
    matches!(status, ExpenseStatus::Active | ExpenseStatus::Completed)
}

/// Total normalized cost of `expenses` over `period`, in `currency`.
#[must_use]
pub fn expense_run_rate(expenses: &[expense::Model], period: Period, currency: Currency) -> f64 {
    expenses
        .iter()
        .filter(|e| counts_toward_run_rate(e.status))
        .map(|e| convert(normalized_amount(e.amount, e.cadence, period), e.currency, currency))
        .sum()
}

/// Portfolio-level totals for one owner in a single display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Currency every amount below is expressed in
    pub currency: Currency,
    /// Number of projects included
    pub project_count: usize,
    /// Sum of project prices
    pub total_revenue: f64,
    /// Sum of platform fees
    pub total_platform_fees: f64,
    /// Sum of expenses allocated to projects
    pub total_allocated_expenses: f64,
    /// Sum of charity deductions
    pub total_charity: f64,
    /// Sum of project final amounts
    pub total_final_amount: f64,
    /// Sum of partner payouts
    pub total_partner_payouts: f64,
    /// Sum of withdrawals
    pub total_withdrawals: f64,
    /// Final amount left after withdrawals
    pub balance: f64,
    /// Monthly run-rate of the owner's expenses
    pub monthly_expense_run_rate: f64,
}

/// Builds the portfolio summary for `owner_id`.
///
/// Projects are recalculated on read first, so the totals never reflect stale
/// aggregates. A project whose recalculation fails is still counted with its last
/// persisted aggregate; the failure is logged by the project listing.
pub async fn portfolio_summary(
    db: &DatabaseConnection,
    owner_id: &str,
    currency: Currency,
) -> Result<PortfolioSummary> {
    let projects = project::list_projects_for_owner(db, owner_id).await?;
    let withdrawals = withdrawal::get_withdrawals_for_owner(db, owner_id).await?;
    let expenses = get_expenses_for_owner(db, owner_id).await?;

    let mut summary = PortfolioSummary {
        currency,
        project_count: projects.len(),
        total_revenue: 0.0,
        total_platform_fees: 0.0,
        total_allocated_expenses: 0.0,
        total_charity: 0.0,
        total_final_amount: 0.0,
        total_partner_payouts: 0.0,
        total_withdrawals: 0.0,
        balance: 0.0,
        monthly_expense_run_rate: expense_run_rate(&expenses, Period::Monthly, currency),
    };

    for p in &projects {
        let to_display = |amount: f64| convert(amount, p.currency, currency);
        summary.total_revenue += to_display(p.price);
        summary.total_platform_fees += to_display(p.platform_fee_amount);
        summary.total_allocated_expenses += to_display(p.allocated_expenses);
        summary.total_charity += to_display(p.charity_amount);
        summary.total_final_amount += to_display(p.final_amount);
        summary.total_partner_payouts += to_display(p.partner_share_amount);
    }

    summary.total_withdrawals = withdrawals
        .iter()
        .map(|w| convert(w.amount, w.currency, currency))
        .sum();
    summary.balance = summary.total_final_amount - summary.total_withdrawals;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::withdrawal::{NewWithdrawal, create_withdrawal},
        test_utils::*,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_normalized_amount_by_cadence() {
        assert!(approx(normalized_amount(1200.0, Cadence::Yearly, Period::Monthly), 100.0));
        assert!(approx(normalized_amount(300.0, Cadence::Quarterly, Period::Monthly), 100.0));
        assert!(approx(normalized_amount(600.0, Cadence::BiAnnual, Period::Monthly), 100.0));
        assert!(approx(normalized_amount(100.0, Cadence::Monthly, Period::Annual), 1200.0));
        assert!(approx(normalized_amount(1200.0, Cadence::Yearly, Period::Quarterly), 300.0));
        assert!(approx(normalized_amount(52.0 * 12.0, Cadence::Yearly, Period::Weekly), 12.0));
    }

    #[test]
    fn test_one_time_counted_in_full() {
        for period in [Period::Weekly, Period::Monthly, Period::Quarterly, Period::Annual] {
            assert!(approx(normalized_amount(500.0, Cadence::OneTime, period), 500.0));
        }
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("Quarter".parse::<Period>().unwrap(), Period::Quarterly);
        assert_eq!("yearly".parse::<Period>().unwrap(), Period::Annual);
        assert!(matches!(
            "fortnightly".parse::<Period>(),
            Err(Error::UnknownPeriod { value }) if value == "fortnightly"
        ));
    }

    #[tokio::test]
    async fn test_run_rate_counts_active_and_completed() -> Result<()> {
        let db = setup_test_db().await?;
        let cases = [
            (1200.0, Cadence::Yearly, ExpenseStatus::Active),
            (50.0, Cadence::Monthly, ExpenseStatus::Completed),
            (999.0, Cadence::Monthly, ExpenseStatus::Cancelled),
        ];
        for (amount, cadence, status) in cases {
            create_custom_expense(&db, amount, Currency::Dollars, cadence, status, &[]).await?;
        }

        let expenses = get_expenses_for_owner(&db, TEST_OWNER).await?;
        assert!(approx(expense_run_rate(&expenses, Period::Monthly, Currency::Dollars), 150.0));
        assert!(approx(expense_run_rate(&expenses, Period::Annual, Currency::Dollars), 1800.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_portfolio_summary_balance() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        create_test_expense(&db, 100.0, Currency::Dollars, &[project.id.as_str()]).await?;
        create_withdrawal(
            &db,
            NewWithdrawal {
                owner_id: TEST_OWNER.to_string(),
                amount: 200.0,
                currency: Currency::Dollars,
                note: None,
                project_ids: vec![project.id.clone()],
                withdrawn_at: None,
            },
        )
        .await?;

        let summary = portfolio_summary(&db, TEST_OWNER, Currency::Dollars).await?;
        assert_eq!(summary.project_count, 1);
        assert!(approx(summary.total_revenue, 1000.0));
        assert!(approx(summary.total_platform_fees, 200.0));
        assert!(approx(summary.total_allocated_expenses, 100.0));
        assert!(approx(summary.total_final_amount, 700.0));
        assert!(approx(summary.total_withdrawals, 200.0));
        assert!(approx(summary.balance, 500.0));
        assert!(approx(summary.monthly_expense_run_rate, 100.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_portfolio_summary_converts_to_display_currency() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_project(&db, 8300.0, Currency::Inr, 0.0).await?;
        create_test_project(&db, 100.0, Currency::Dollars, 0.0).await?;

        let summary = portfolio_summary(&db, TEST_OWNER, Currency::Dollars).await?;
        assert_eq!(summary.project_count, 2);
        assert!(approx(summary.total_revenue, 200.0));
        assert!(approx(summary.balance, 200.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_portfolio_summary_empty_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let summary = portfolio_summary(&db, "nobody", Currency::Euro).await?;
        assert_eq!(summary.project_count, 0);
        assert!(approx(summary.balance, 0.0));
        Ok(())
    }
}
