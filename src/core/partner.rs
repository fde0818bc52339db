//! Partner business logic - partner records and their assignment to projects.
//!
//! Partners are matched by stable id only. Every change to a project's partner list
//! is validated (no share outside 0-100, no duplicates, total at most 100%) before it
//! is written, and the project is recalculated afterwards so payouts stay current.

use crate::{
    config::settings::PartnerConfig,
    core::{
        distribution::{self, PartnerShare},
        recalc::{self, RecalcReport},
    },
    entities::{Partner, Project, ProjectPartner, partner, project, project_partner},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

/// A partner joined with its share of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerPayout {
    /// The partner record
    pub partner: partner::Model,
    /// Share percentage on the project
    pub share_percent: f64,
    /// Advisory payout from the last recalculation
    pub share_amount: f64,
}

/// Creates a partner. A fresh UUID is used when `id` is `None`.
pub async fn create_partner(
    db: &DatabaseConnection,
    name: String,
    id: Option<String>,
) -> Result<partner::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName { name });
    }

    let model = partner::ActiveModel {
        id: Set(id.unwrap_or_else(|| Uuid::new_v4().to_string())),
        name: Set(name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
    };
    model.insert(db).await.map_err(Into::into)
}

/// Finds a partner by id.
pub async fn get_partner_by_id(
    db: &DatabaseConnection,
    partner_id: &str,
) -> Result<Option<partner::Model>> {
    Partner::find_by_id(partner_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all partners alphabetically.
pub async fn get_all_partners(db: &DatabaseConnection) -> Result<Vec<partner::Model>> {
    Partner::find()
        .order_by_asc(partner::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts configured partners that are not in the database yet.
///
/// Returns the number of partners created.
pub async fn seed_partners(db: &DatabaseConnection, partners: &[PartnerConfig]) -> Result<usize> {
    let mut created = 0;
    for config in partners {
        if get_partner_by_id(db, &config.id).await?.is_none() {
            create_partner(db, config.name.clone(), Some(config.id.clone())).await?;
            created += 1;
        }
    }
    if created > 0 {
        info!(created, "Seeded partners from configuration");
    }
    Ok(created)
}

async fn current_shares(db: &DatabaseConnection, project_id: &str) -> Result<Vec<PartnerShare>> {
    Ok(ProjectPartner::find()
        .filter(project_partner::Column::ProjectId.eq(project_id))
        .order_by_asc(project_partner::Column::PartnerId)
        .all(db)
        .await?
        .into_iter()
        .map(|row| PartnerShare::new(row.partner_id, row.share_percent))
        .collect())
}

/// Replaces a project's partner list and recalculates the project.
///
/// # Errors
/// Returns an error if:
/// - The shares fail validation (see [`distribution::validate_shares`])
/// - The project or any referenced partner does not exist
/// - The database write fails
///
/// Nothing is written when validation fails.
pub async fn set_project_partners(
    db: &DatabaseConnection,
    project_id: &str,
    shares: Vec<PartnerShare>,
) -> Result<project::Model> {
    distribution::validate_shares(&shares)?;

    let txn = db.begin().await?;
    if Project::find_by_id(project_id.to_string())
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(Error::ProjectNotFound {
            id: project_id.to_string(),
        });
    }
    for share in &shares {
        if Partner::find_by_id(share.partner_id.clone())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(Error::PartnerNotFound {
                id: share.partner_id.clone(),
            });
        }
    }

    ProjectPartner::delete_many()
        .filter(project_partner::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    for share in &shares {
        ProjectPartner::insert(project_partner::ActiveModel {
            project_id: Set(project_id.to_string()),
            partner_id: Set(share.partner_id.clone()),
            share_percent: Set(share.share_percent),
            share_amount: Set(0.0),
        })
        .exec(&txn)
        .await?;
    }
    txn.commit().await?;

    info!(project_id, partners = shares.len(), "Updated project partners");
    recalc::recalculate(db, project_id)
        .await?
        .ok_or_else(|| Error::ProjectNotFound {
            id: project_id.to_string(),
        })
}

/// Adds several partners at once, splitting the remaining headroom evenly.
///
/// With `R%` of the project unassigned and `n` partners added, each new partner
/// gets `R / n`. Existing shares are kept.
pub async fn add_partners_evenly(
    db: &DatabaseConnection,
    project_id: &str,
    partner_ids: &[String],
) -> Result<project::Model> {
    let mut shares = current_shares(db, project_id).await?;
    let added = distribution::split_headroom(&shares, partner_ids);
    shares.extend(added);
    set_project_partners(db, project_id, shares).await
}

/// Removes one partner from a project and recalculates it.
pub async fn remove_partner_from_project(
    db: &DatabaseConnection,
    project_id: &str,
    partner_id: &str,
) -> Result<project::Model> {
    let shares: Vec<PartnerShare> = current_shares(db, project_id)
        .await?
        .into_iter()
        .filter(|share| share.partner_id != partner_id)
        .collect();
    set_project_partners(db, project_id, shares).await
}

/// Lists a project's partners with their shares and payouts, by partner name.
pub async fn get_project_payouts(
    db: &DatabaseConnection,
    project_id: &str,
) -> Result<Vec<PartnerPayout>> {
    let rows = ProjectPartner::find()
        .filter(project_partner::Column::ProjectId.eq(project_id))
        .find_also_related(Partner)
        .all(db)
        .await?;

    let mut payouts: Vec<PartnerPayout> = rows
        .into_iter()
        .filter_map(|(share, partner)| {
            partner.map(|partner| PartnerPayout {
                partner,
                share_percent: share.share_percent,
                share_amount: share.share_amount,
            })
        })
        .collect();
    payouts.sort_by(|a, b| a.partner.name.cmp(&b.partner.name));
    Ok(payouts)
}

/// Deletes a partner and recalculates every project it was assigned to.
pub async fn delete_partner(db: &DatabaseConnection, partner_id: &str) -> Result<RecalcReport> {
    let txn = db.begin().await?;
    let partner = Partner::find_by_id(partner_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::PartnerNotFound {
            id: partner_id.to_string(),
        })?;

    let project_ids: Vec<String> = ProjectPartner::find()
        .filter(project_partner::Column::PartnerId.eq(partner_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|row| row.project_id)
        .collect();

    ProjectPartner::delete_many()
        .filter(project_partner::Column::PartnerId.eq(partner_id))
        .exec(&txn)
        .await?;
    partner.delete(&txn).await?;
    txn.commit().await?;

    info!(partner_id, projects = project_ids.len(), "Deleted partner");
    Ok(recalc::recalculate_many(db, project_ids).await)
}
