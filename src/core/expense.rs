//! Expense business logic - recording, editing and removing expenses.
//!
//! An expense is linked to projects through the `expense_projects` table. Any change to
//! an expense's links, amount, currency or status recalculates the union of the projects
//! it was linked to before and after the change. Category and cadence edits do not touch
//! project aggregates.

use crate::{
    core::{
        currency::Currency,
        recalc::{self, RecalcReport},
    },
    entities::{
        Expense, ExpenseProject, Project, expense,
        expense::{Cadence, ExpenseStatus},
        expense_project, project,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, QuerySelect, Set, TransactionTrait, TryIntoModel, prelude::*,
};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

/// Inputs for a new expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Owner recording the expense
    pub owner_id: String,
    /// Stored amount, at least zero
    pub amount: f64,
    /// Currency of the amount
    pub currency: Currency,
    /// Payment cadence
    pub cadence: Cadence,
    /// Initial status
    pub status: ExpenseStatus,
    /// Category label
    pub category: String,
    /// Projects to allocate the expense against
    pub project_ids: Vec<String>,
}

/// A partial edit of an expense. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    /// New amount
    pub amount: Option<f64>,
    /// New currency
    pub currency: Option<Currency>,
    /// New cadence
    pub cadence: Option<Cadence>,
    /// New status
    pub status: Option<ExpenseStatus>,
    /// New category label
    pub category: Option<String>,
    /// Replacement project link list
    pub project_ids: Option<Vec<String>>,
}

/// Result of an expense write: the stored record and the cascade it triggered.
#[derive(Debug)]
pub struct ExpenseChange {
    /// The expense as persisted
    pub expense: expense::Model,
    /// Projects the expense is now linked to
    pub project_ids: Vec<String>,
    /// Recalculation of every affected project
    pub recalculation: RecalcReport,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Deduplicates and sorts a project id list.
fn normalize_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fails with [`Error::ProjectNotFound`] unless every id names an existing project.
pub(crate) async fn ensure_projects_exist<C>(db: &C, project_ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    if project_ids.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<String> = Project::find()
        .select_only()
        .column(project::Column::Id)
        .filter(project::Column::Id.is_in(project_ids.to_vec()))
        .into_tuple::<String>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    match project_ids.iter().find(|id| !found.contains(*id)) {
        Some(missing) => Err(Error::ProjectNotFound {
            id: missing.clone(),
        }),
        None => Ok(()),
    }
}

async fn replace_links<C>(db: &C, expense_id: &str, project_ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    ExpenseProject::delete_many()
        .filter(expense_project::Column::ExpenseId.eq(expense_id))
        .exec(db)
        .await?;

    for project_id in project_ids {
        ExpenseProject::insert(expense_project::ActiveModel {
            expense_id: Set(expense_id.to_string()),
            project_id: Set(project_id.clone()),
        })
        .exec(db)
        .await?;
    }
    Ok(())
}

/// Returns the ids of the projects an expense is linked to, sorted.
pub async fn get_linked_project_ids<C>(db: &C, expense_id: &str) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    ExpenseProject::find()
        .filter(expense_project::Column::ExpenseId.eq(expense_id))
        .order_by_asc(expense_project::Column::ProjectId)
        .all(db)
        .await
        .map(|links| links.into_iter().map(|link| link.project_id).collect())
        .map_err(Into::into)
}

/// Finds an expense by id.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: &str,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns every expense recorded by `owner_id`, oldest first.
pub async fn get_expenses_for_owner(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::OwnerId.eq(owner_id))
        .order_by_asc(expense::Column::CreatedAt)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records an expense, links it to its projects and recalculates them.
///
/// # Errors
/// Returns an error if:
/// - The amount is negative or not finite
/// - Any linked project does not exist
/// - The database write fails
///
/// Recalculation failures do not fail the call; they are reported in
/// [`ExpenseChange::recalculation`].
pub async fn create_expense(db: &DatabaseConnection, new: NewExpense) -> Result<ExpenseChange> {
    validate_amount(new.amount)?;
    let project_ids = normalize_ids(new.project_ids);

    let txn = db.begin().await?;
    ensure_projects_exist(&txn, &project_ids).await?;

    let model = expense::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        owner_id: Set(new.owner_id),
        amount: Set(new.amount),
        currency: Set(new.currency),
        cadence: Set(new.cadence),
        status: Set(new.status),
        category: Set(new.category.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
    };
    let expense = model.insert(&txn).await?;
    replace_links(&txn, &expense.id, &project_ids).await?;
    txn.commit().await?;

    info!(expense_id = %expense.id, projects = project_ids.len(), "Created expense");
    let recalculation = recalc::recalculate_affected(db, &[], &project_ids).await;

    Ok(ExpenseChange {
        expense,
        project_ids,
        recalculation,
    })
}

/// Edits an expense and recalculates every project it was or is now linked to.
///
/// Edits that only touch the category or cadence skip recalculation, since neither
/// feeds per-project allocation.
pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: &str,
    update: ExpenseUpdate,
) -> Result<ExpenseChange> {
    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    let txn = db.begin().await?;
    let existing = Expense::find_by_id(expense_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ExpenseNotFound {
            id: expense_id.to_string(),
        })?;
    let previous_ids = get_linked_project_ids(&txn, expense_id).await?;

    let affects_allocation = update.amount.is_some_and(|a| a != existing.amount)
        || update.currency.is_some_and(|c| c != existing.currency)
        || update.status.is_some_and(|s| s != existing.status);

    let mut active: expense::ActiveModel = existing.into();
    if let Some(amount) = update.amount {
        active.amount = Set(amount);
    }
    if let Some(currency) = update.currency {
        active.currency = Set(currency);
    }
    if let Some(cadence) = update.cadence {
        active.cadence = Set(cadence);
    }
    if let Some(status) = update.status {
        active.status = Set(status);
    }
    if let Some(category) = update.category {
        active.category = Set(category.trim().to_string());
    }
    let expense = if active.is_changed() {
        active.update(&txn).await?
    } else {
        active.try_into_model()?
    };

    let current_ids = match update.project_ids {
        Some(ids) => {
            let ids = normalize_ids(ids);
            ensure_projects_exist(&txn, &ids).await?;
            replace_links(&txn, expense_id, &ids).await?;
            ids
        }
        None => previous_ids.clone(),
    };
    txn.commit().await?;

    let links_changed = current_ids != previous_ids;
    let recalculation = if affects_allocation || links_changed {
        recalc::recalculate_affected(db, &previous_ids, &current_ids).await
    } else {
        RecalcReport::default()
    };

    Ok(ExpenseChange {
        expense,
        project_ids: current_ids,
        recalculation,
    })
}

/// Deletes an expense and recalculates the projects it was linked to.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: &str) -> Result<RecalcReport> {
    let txn = db.begin().await?;
    let existing = Expense::find_by_id(expense_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ExpenseNotFound {
            id: expense_id.to_string(),
        })?;
    let previous_ids = get_linked_project_ids(&txn, expense_id).await?;

    ExpenseProject::delete_many()
        .filter(expense_project::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(expense_id, projects = previous_ids.len(), "Deleted expense");
    Ok(recalc::recalculate_affected(db, &previous_ids, &[]).await)
}
