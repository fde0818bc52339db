//! Recalculation cascade - keeps every project aggregate consistent with its inputs.
//!
//! A project goes stale whenever it, a linked expense, a linked withdrawal, or one of its
//! partner assignments changes. [`recalculate`] re-derives the whole aggregate from current
//! state (allocation, waterfall, partner payouts) and persists it in one database
//! transaction, so a failed write leaves the previous aggregate in place.
//!
//! There is no per-project locking. Two concurrent recalculations of the same project both
//! read a consistent snapshot and the later write wins.

use crate::{
    core::{
        allocation,
        distribution::{self, PartnerShare, Payout},
        waterfall::{Waterfall, compute_waterfall},
    },
    entities::{Project, ProjectPartner, project, project_partner},
    errors::{Error, Result},
};
use futures::future::join_all;
use sea_orm::{QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::BTreeSet;
use tracing::{debug, error, info};

/// Outcome of recalculating a batch of projects.
///
/// A failure on one project never stops the others; it is recorded here instead.
#[derive(Debug, Default)]
pub struct RecalcReport {
    /// Projects whose aggregate was recomputed and persisted
    pub recalculated: Vec<String>,
    /// Requested ids that matched no project
    pub missing: Vec<String>,
    /// Projects whose recalculation failed, with the error
    pub failed: Vec<(String, Error)>,
}

impl RecalcReport {
    /// True when nothing failed. Missing projects do not count as failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of project ids that were attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.recalculated.len() + self.missing.len() + self.failed.len()
    }
}

/// Union of the project ids an expense (or withdrawal) was linked to before and after a
/// change. Both sides must be recalculated so an unlinked project drops the contribution.
#[must_use]
pub fn affected_project_ids(previous: &[String], current: &[String]) -> BTreeSet<String> {
    previous.iter().chain(current).cloned().collect()
}

fn to_shares(rows: &[project_partner::Model]) -> Vec<PartnerShare> {
    rows.iter()
        .map(|row| PartnerShare::new(row.partner_id.clone(), row.share_percent))
        .collect()
}

/// Re-derives and persists one project's aggregate.
///
/// Returns `Ok(None)` if the project does not exist; that case is logged, not raised,
/// because recalculation is often requested speculatively.
///
/// # Errors
/// Returns an error if reading state or persisting the aggregate fails. On a persistence
/// failure the previously stored aggregate is left untouched.
pub async fn recalculate(
    db: &DatabaseConnection,
    project_id: &str,
) -> Result<Option<project::Model>> {
    let Some(project) = Project::find_by_id(project_id.to_string()).one(db).await? else {
        error!(project_id, "Recalculation requested for unknown project");
        return Ok(None);
    };

    let expenses = allocation::load_linked_expenses(db, project_id).await?;
    let allocated = allocation::allocate(project_id, project.currency, &expenses);
    let waterfall = compute_waterfall(
        project.price,
        project.fee_percent,
        allocated,
        project.charity_enabled,
    );

    let share_rows = ProjectPartner::find()
        .filter(project_partner::Column::ProjectId.eq(project_id))
        .all(db)
        .await?;
    let payouts = distribution::distribute(waterfall.final_amount, &to_shares(&share_rows));

    debug!(
        project_id,
        linked_expenses = expenses.len(),
        allocated,
        final_amount = waterfall.final_amount,
        partners = payouts.len(),
        "Recomputed project aggregate"
    );

    persist_aggregate(db, project, &waterfall, share_rows, &payouts)
        .await
        .map(Some)
}

async fn persist_aggregate(
    db: &DatabaseConnection,
    project: project::Model,
    waterfall: &Waterfall,
    share_rows: Vec<project_partner::Model>,
    payouts: &[Payout],
) -> Result<project::Model> {
    let partner_share_amount: f64 = payouts.iter().map(|p| p.amount).sum();

    let txn = db.begin().await?;

    let mut active: project::ActiveModel = project.into();
    active.platform_fee_amount = Set(waterfall.platform_fee_amount);
    active.after_platform_fee = Set(waterfall.after_platform_fee);
    active.allocated_expenses = Set(waterfall.allocated_expenses);
    active.after_expenses = Set(waterfall.after_expenses);
    active.charity_amount = Set(waterfall.charity_amount);
    active.after_charity = Set(waterfall.after_charity);
    active.final_amount = Set(waterfall.final_amount);
    active.partner_share_amount = Set(partner_share_amount);
    let updated = active.update(&txn).await?;

    // distribute() preserves input order, so rows and payouts line up.
    for (row, payout) in share_rows.into_iter().zip(payouts) {
        let mut share: project_partner::ActiveModel = row.into();
        share.share_amount = Set(payout.amount);
        share.update(&txn).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

/// Recalculates every distinct project id in `project_ids`.
///
/// Projects are independent, so they are recalculated concurrently. Failures are
/// isolated per project and collected in the returned report.
pub async fn recalculate_many<I>(db: &DatabaseConnection, project_ids: I) -> RecalcReport
where
    I: IntoIterator<Item = String>,
{
    let ids: BTreeSet<String> = project_ids.into_iter().collect();
    let outcomes = join_all(ids.into_iter().map(|id| async move {
        let outcome = recalculate(db, &id).await;
        (id, outcome)
    }))
    .await;

    let mut report = RecalcReport::default();
    for (id, outcome) in outcomes {
        match outcome {
            Ok(Some(_)) => report.recalculated.push(id),
            Ok(None) => report.missing.push(id),
            Err(e) => {
                error!(project_id = %id, error = %e, "Project recalculation failed");
                report.failed.push((id, e));
            }
        }
    }
    report
}

/// Recalculates the union of the previous and current linked project ids.
pub async fn recalculate_affected(
    db: &DatabaseConnection,
    previous: &[String],
    current: &[String],
) -> RecalcReport {
    let affected = affected_project_ids(previous, current);
    if affected.is_empty() {
        return RecalcReport::default();
    }
    debug!(count = affected.len(), "Recalculating affected projects");
    recalculate_many(db, affected).await
}

/// Recalculates every project in the database.
pub async fn recalculate_all(db: &DatabaseConnection) -> Result<RecalcReport> {
    let ids: Vec<String> = Project::find()
        .select_only()
        .column(project::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    let report = recalculate_many(db, ids).await;
    info!(
        recalculated = report.recalculated.len(),
        failed = report.failed.len(),
        "Recalculated all projects"
    );
    Ok(report)
}
