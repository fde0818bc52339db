//! Withdrawal business logic - cash-out events against projects.
//!
//! Withdrawals feed the portfolio balance only. Creating or deleting one still
//! recalculates the linked projects so their aggregates are fresh when the balance
//! view reads them.

use crate::{
    core::{
        currency::Currency,
        expense::ensure_projects_exist,
        recalc::{self, RecalcReport},
    },
    entities::{Withdrawal, WithdrawalProject, withdrawal, withdrawal_project},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

/// Inputs for a new withdrawal.
#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    /// Owner withdrawing
    pub owner_id: String,
    /// Amount, greater than zero
    pub amount: f64,
    /// Currency of the amount
    pub currency: Currency,
    /// Optional note
    pub note: Option<String>,
    /// Projects the money is drawn from
    pub project_ids: Vec<String>,
    /// When the money left; defaults to now
    pub withdrawn_at: Option<DateTime<Utc>>,
}

/// Returns the ids of the projects a withdrawal is linked to, sorted.
pub async fn get_withdrawal_project_ids<C>(db: &C, withdrawal_id: &str) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    Ok(WithdrawalProject::find()
        .filter(withdrawal_project::Column::WithdrawalId.eq(withdrawal_id))
        .order_by_asc(withdrawal_project::Column::ProjectId)
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.project_id)
        .collect())
}

/// Returns every withdrawal made by `owner_id`, newest first.
pub async fn get_withdrawals_for_owner(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<withdrawal::Model>> {
    Withdrawal::find()
        .filter(withdrawal::Column::OwnerId.eq(owner_id))
        .order_by_desc(withdrawal::Column::WithdrawnAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a withdrawal and recalculates its linked projects.
///
/// # Errors
/// Returns an error if the amount is not a positive finite number, a linked project
/// does not exist, or the database write fails.
pub async fn create_withdrawal(
    db: &DatabaseConnection,
    new: NewWithdrawal,
) -> Result<(withdrawal::Model, RecalcReport)> {
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }
    let project_ids: Vec<String> = new
        .project_ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let txn = db.begin().await?;
    ensure_projects_exist(&txn, &project_ids).await?;

    let model = withdrawal::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        owner_id: Set(new.owner_id),
        amount: Set(new.amount),
        currency: Set(new.currency),
        note: Set(new.note.filter(|n| !n.trim().is_empty())),
        withdrawn_at: Set(new.withdrawn_at.unwrap_or_else(Utc::now)),
    };
    let withdrawal = model.insert(&txn).await?;

    for project_id in &project_ids {
        WithdrawalProject::insert(withdrawal_project::ActiveModel {
            withdrawal_id: Set(withdrawal.id.clone()),
            project_id: Set(project_id.clone()),
        })
        .exec(&txn)
        .await?;
    }
    txn.commit().await?;

    info!(withdrawal_id = %withdrawal.id, amount = withdrawal.amount, "Recorded withdrawal");
    let report = recalc::recalculate_affected(db, &[], &project_ids).await;
    Ok((withdrawal, report))
}

/// Deletes a withdrawal and recalculates the projects it was linked to.
pub async fn delete_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: &str,
) -> Result<RecalcReport> {
    let txn = db.begin().await?;
    let existing = Withdrawal::find_by_id(withdrawal_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::WithdrawalNotFound {
            id: withdrawal_id.to_string(),
        })?;
    let project_ids = get_withdrawal_project_ids(&txn, withdrawal_id).await?;

    WithdrawalProject::delete_many()
        .filter(withdrawal_project::Column::WithdrawalId.eq(withdrawal_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    Ok(recalc::recalculate_affected(db, &project_ids, &[]).await)
}
