//! Expense allocation - the total of active expenses linked to one project.
//!
//! Allocation always uses the full stored amount of every matching expense. Cadence
//! (monthly, yearly, ...) is deliberately ignored here; period normalization is a
//! display concern handled by [`crate::core::dashboard`].

use crate::{
    core::currency::{Currency, convert},
    entities::{Expense, ExpenseProject, expense, expense_project},
    errors::Result,
};
use sea_orm::{ConnectionTrait, prelude::*};
use std::collections::HashMap;

/// An expense together with every project it is linked to.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedExpense {
    /// The expense record
    pub expense: expense::Model,
    /// Ids of all projects the expense is linked to
    pub project_ids: Vec<String>,
}

impl LinkedExpense {
    /// Whether this expense is linked to `project_id`.
    #[must_use]
    pub fn is_linked_to(&self, project_id: &str) -> bool {
        self.project_ids.iter().any(|id| id == project_id)
    }
}

/// Sums the active expenses linked to `project_id`, converted to `project_currency`.
///
/// Expenses that are not linked to the project, or whose status is not
/// [`expense::ExpenseStatus::Active`], contribute nothing.
#[must_use]
pub fn allocate(project_id: &str, project_currency: Currency, expenses: &[LinkedExpense]) -> f64 {
    expenses
        .iter()
        .filter(|linked| linked.expense.status == expense::ExpenseStatus::Active)
        .filter(|linked| linked.is_linked_to(project_id))
        .map(|linked| convert(linked.expense.amount, linked.expense.currency, project_currency))
        .sum()
}

/// Attaches project link lists to a set of expenses.
#[must_use]
pub fn attach_links(
    expenses: Vec<expense::Model>,
    links: &[expense_project::Model],
) -> Vec<LinkedExpense> {
    let mut by_expense: HashMap<&str, Vec<String>> = HashMap::new();
    for link in links {
        by_expense
            .entry(link.expense_id.as_str())
            .or_default()
            .push(link.project_id.clone());
    }

    expenses
        .into_iter()
        .map(|expense| {
            let mut project_ids = by_expense.remove(expense.id.as_str()).unwrap_or_default();
            project_ids.sort();
            LinkedExpense {
                expense,
                project_ids,
            }
        })
        .collect()
}

/// Loads the active expenses linked to `project_id`, with all of their links.
///
/// The `expense_projects` table is used as an index so only linked expenses are read,
/// never the whole expense collection.
pub async fn load_linked_expenses<C>(db: &C, project_id: &str) -> Result<Vec<LinkedExpense>>
where
    C: ConnectionTrait,
{
    let expense_ids: Vec<String> = ExpenseProject::find()
        .filter(expense_project::Column::ProjectId.eq(project_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.expense_id)
        .collect();

    if expense_ids.is_empty() {
        return Ok(Vec::new());
    }

    let expenses = Expense::find()
        .filter(expense::Column::Id.is_in(expense_ids.clone()))
        .filter(expense::Column::Status.eq(expense::ExpenseStatus::Active))
        .all(db)
        .await?;

    let links = ExpenseProject::find()
        .filter(expense_project::Column::ExpenseId.is_in(expense_ids))
        .all(db)
        .await?;

    Ok(attach_links(expenses, &links))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::expense::{Cadence, ExpenseStatus};
    use crate::test_utils::*;

    fn linked(
        id: &str,
        amount: f64,
        currency: Currency,
        status: ExpenseStatus,
        cadence: Cadence,
        project_ids: &[&str],
    ) -> LinkedExpense {
        LinkedExpense {
            expense: expense::Model {
                id: id.to_string(),
                owner_id: "owner".to_string(),
                amount,
                currency,
                cadence,
                status,
                category: "software".to_string(),
                created_at: chrono::Utc::now(),
            },
            project_ids: project_ids.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_allocate_only_linked_active_expenses() {
        let expenses = vec![
            linked("e1", 100.0, Currency::Dollars, ExpenseStatus::Active, Cadence::OneTime, &["p1"]),
            linked("e2", 50.0, Currency::Dollars, ExpenseStatus::Cancelled, Cadence::OneTime, &["p1"]),
            linked("e3", 25.0, Currency::Dollars, ExpenseStatus::Completed, Cadence::OneTime, &["p1"]),
            linked("e4", 10.0, Currency::Dollars, ExpenseStatus::Active, Cadence::OneTime, &["p2"]),
            linked("e5", 5.0, Currency::Dollars, ExpenseStatus::Active, Cadence::OneTime, &["p2", "p1"]),
        ];

        assert_eq!(allocate("p1", Currency::Dollars, &expenses), 105.0);
        assert_eq!(allocate("p2", Currency::Dollars, &expenses), 15.0);
        assert_eq!(allocate("p3", Currency::Dollars, &expenses), 0.0);
    }

    #[test]
    fn test_allocate_converts_to_project_currency() {
        let expenses = vec![
            linked("e1", 100.0, Currency::Dollars, ExpenseStatus::Active, Cadence::Monthly, &["p1"]),
            linked("e2", 830.0, Currency::Inr, ExpenseStatus::Active, Cadence::Monthly, &["p1"]),
        ];

        let total = allocate("p1", Currency::Inr, &expenses);
        assert!((total - 9130.0).abs() < 1e-6);
    }

    #[test]
    fn test_allocate_ignores_cadence() {
        let expenses = vec![
            linked("e1", 1200.0, Currency::Dollars, ExpenseStatus::Active, Cadence::Yearly, &["p1"]),
            linked("e2", 300.0, Currency::Dollars, ExpenseStatus::Active, Cadence::Quarterly, &["p1"]),
        ];

        assert_eq!(allocate("p1", Currency::Dollars, &expenses), 1500.0);
    }

    #[test]
    fn test_attach_links_groups_by_expense() {
        let expenses = vec![
            linked("e1", 1.0, Currency::Dollars, ExpenseStatus::Active, Cadence::OneTime, &[]).expense,
            linked("e2", 1.0, Currency::Dollars, ExpenseStatus::Active, Cadence::OneTime, &[]).expense,
        ];
        let links = vec![
            expense_project::Model {
                expense_id: "e1".to_string(),
                project_id: "p2".to_string(),
            },
            expense_project::Model {
                expense_id: "e1".to_string(),
                project_id: "p1".to_string(),
            },
        ];

        let attached = attach_links(expenses, &links);
        assert_eq!(attached[0].project_ids, vec!["p1", "p2"]);
        assert!(attached[1].project_ids.is_empty());
    }

    #[tokio::test]
    async fn test_load_linked_expenses_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let p1 = create_test_project(&db, 1000.0, Currency::Dollars, 0.0).await?;
        let p2 = create_test_project(&db, 1000.0, Currency::Dollars, 0.0).await?;

        let shared = create_test_expense(&db, 40.0, Currency::Dollars, &[p1.id.as_str(), p2.id.as_str()]).await?;
        create_test_expense(&db, 10.0, Currency::Dollars, &[p2.id.as_str()]).await?;

        let loaded = load_linked_expenses(&db, &p1.id).await?;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].expense.id, shared.id);
        assert_eq!(loaded[0].project_ids.len(), 2);
        assert!(loaded[0].is_linked_to(&p2.id));

        let p2_expenses = load_linked_expenses(&db, &p2.id).await?;
        assert_eq!(allocate(&p2.id, Currency::Dollars, &p2_expenses), 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_linked_expenses_none_linked() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_test_project(&db, 10.0, Currency::Euro, 0.0).await?;
        assert!(load_linked_expenses(&db, &project.id).await?.is_empty());
        Ok(())
    }
}
