//! Project business logic - create, edit, read and delete projects.
//!
//! Every write is followed by a recalculation, and every read recalculates before
//! returning, so callers never see a stale aggregate. Derived columns are never
//! accepted from callers.

use crate::{
    core::{currency::Currency, recalc},
    entities::{
        ExpenseProject, Project, ProjectPartner, WithdrawalProject, expense_project, project,
        project_partner, withdrawal_project,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{error, info};
use uuid::Uuid;

/// User-editable inputs of a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Owner creating the project
    pub owner_id: String,
    /// Display name
    pub name: String,
    /// Gross price, at least zero
    pub price: f64,
    /// Billing currency
    pub currency: Currency,
    /// Platform fee percentage (0-100)
    pub fee_percent: f64,
    /// Whether the charity deduction applies
    pub charity_enabled: bool,
}

/// A partial edit of a project's inputs. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// New display name
    pub name: Option<String>,
    /// New gross price
    pub price: Option<f64>,
    /// New billing currency
    pub currency: Option<Currency>,
    /// New platform fee percentage
    pub fee_percent: Option<f64>,
    /// New charity flag
    pub charity_enabled: Option<bool>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

fn validate_fee_percent(fee_percent: f64) -> Result<()> {
    if !fee_percent.is_finite() || !(0.0..=100.0).contains(&fee_percent) {
        return Err(Error::InvalidPercentage { value: fee_percent });
    }
    Ok(())
}

async fn recalculated(db: &DatabaseConnection, project_id: &str) -> Result<project::Model> {
    recalc::recalculate(db, project_id)
        .await?
        .ok_or_else(|| Error::ProjectNotFound {
            id: project_id.to_string(),
        })
}

/// Creates a project and computes its initial aggregate.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The price is negative or not finite
/// - The fee percentage is outside `0..=100`
/// - The database insert or the recalculation fails
pub async fn create_project(db: &DatabaseConnection, new: NewProject) -> Result<project::Model> {
    validate_name(&new.name)?;
    validate_price(new.price)?;
    validate_fee_percent(new.fee_percent)?;

    let now = chrono::Utc::now();
    let id = Uuid::new_v4().to_string();

    let model = project::ActiveModel {
        id: Set(id.clone()),
        owner_id: Set(new.owner_id),
        name: Set(new.name.trim().to_string()),
        price: Set(new.price),
        currency: Set(new.currency),
        fee_percent: Set(new.fee_percent),
        charity_enabled: Set(new.charity_enabled),
        platform_fee_amount: Set(0.0),
        after_platform_fee: Set(0.0),
        allocated_expenses: Set(0.0),
        after_expenses: Set(0.0),
        charity_amount: Set(0.0),
        after_charity: Set(0.0),
        final_amount: Set(0.0),
        partner_share_amount: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Project::insert(model).exec(db).await?;

    info!(project_id = %id, "Created project");
    recalculated(db, &id).await
}

/// Applies a direct edit to a project's inputs and recalculates it.
///
/// # Errors
/// Returns [`Error::ProjectNotFound`] for an unknown id, or a validation error for
/// any invalid new value.
pub async fn update_project(
    db: &DatabaseConnection,
    project_id: &str,
    update: ProjectUpdate,
) -> Result<project::Model> {
    let project = Project::find_by_id(project_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::ProjectNotFound {
            id: project_id.to_string(),
        })?;

    let mut active: project::ActiveModel = project.into();
    if let Some(name) = update.name {
        validate_name(&name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = update.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(currency) = update.currency {
        active.currency = Set(currency);
    }
    if let Some(fee_percent) = update.fee_percent {
        validate_fee_percent(fee_percent)?;
        active.fee_percent = Set(fee_percent);
    }
    if let Some(charity_enabled) = update.charity_enabled {
        active.charity_enabled = Set(charity_enabled);
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await?;

    recalculated(db, project_id).await
}

/// Reads a project, recalculating it first.
pub async fn get_project(
    db: &DatabaseConnection,
    project_id: &str,
) -> Result<Option<project::Model>> {
    recalc::recalculate(db, project_id).await
}

/// Lists an owner's projects, oldest first, recalculating each one before returning.
///
/// A project whose recalculation fails is still listed with its last persisted
/// aggregate; the failure is logged.
pub async fn list_projects_for_owner(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<project::Model>> {
    let ids: Vec<String> = Project::find()
        .filter(project::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let report = recalc::recalculate_many(db, ids).await;
    if !report.is_clean() {
        error!(
            owner_id,
            failed = report.failed.len(),
            "Some projects could not be recalculated before listing"
        );
    }

    Project::find()
        .filter(project::Column::OwnerId.eq(owner_id))
        .order_by_asc(project::Column::CreatedAt)
        .order_by_asc(project::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a project together with its partner assignments and expense/withdrawal links.
///
/// The linked expenses and withdrawals themselves are kept.
pub async fn delete_project(db: &DatabaseConnection, project_id: &str) -> Result<()> {
    let txn = db.begin().await?;

    let project = Project::find_by_id(project_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ProjectNotFound {
            id: project_id.to_string(),
        })?;

    ProjectPartner::delete_many()
        .filter(project_partner::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    ExpenseProject::delete_many()
        .filter(expense_project::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    WithdrawalProject::delete_many()
        .filter(withdrawal_project::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    project.delete(&txn).await?;

    txn.commit().await?;
    info!(project_id, "Deleted project");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::expense as expense_ops;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_project(price: f64, fee_percent: f64) -> NewProject {
        NewProject {
            owner_id: TEST_OWNER.to_string(),
            name: "Website".to_string(),
            price,
            currency: Currency::Dollars,
            fee_percent,
            charity_enabled: false,
        }
    }

    #[tokio::test]
    async fn test_create_project_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut blank = new_project(100.0, 10.0);
        blank.name = "   ".to_string();
        assert!(matches!(
            create_project(&db, blank).await,
            Err(Error::InvalidName { .. })
        ));

        assert!(matches!(
            create_project(&db, new_project(-1.0, 10.0)).await,
            Err(Error::InvalidAmount { amount }) if amount == -1.0
        ));
        assert!(matches!(
            create_project(&db, new_project(f64::NAN, 10.0)).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            create_project(&db, new_project(100.0, 120.0)).await,
            Err(Error::InvalidPercentage { value }) if value == 120.0
        ));
        assert!(matches!(
            create_project(&db, new_project(100.0, -5.0)).await,
            Err(Error::InvalidPercentage { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_project_computes_aggregate() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, new_project(1000.0, 20.0)).await?;

        assert_eq!(project.name, "Website");
        assert_eq!(project.platform_fee_amount, 200.0);
        assert_eq!(project.final_amount, 800.0);
        assert_eq!(project.partner_share_amount, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_project_recalculates() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        assert_eq!(project.final_amount, 800.0);

        let updated = update_project(
            &db,
            &project.id,
            ProjectUpdate {
                charity_enabled: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert!((updated.final_amount - 760.0).abs() < 1e-9);

        let updated = update_project(
            &db,
            &project.id,
            ProjectUpdate {
                price: Some(500.0),
                fee_percent: Some(10.0),
                charity_enabled: Some(false),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.platform_fee_amount, 50.0);
        assert_eq!(updated.final_amount, 450.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_project_currency_reconverts_expenses() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        create_test_expense(&db, 100.0, Currency::Dollars, &[project.id.as_str()]).await?;

        let updated = update_project(
            &db,
            &project.id,
            ProjectUpdate {
                price: Some(83_000.0),
                currency: Some(Currency::Inr),
                fee_percent: Some(0.0),
                ..Default::default()
            },
        )
        .await?;
        assert!((updated.allocated_expenses - 8300.0).abs() < 1e-9);
        assert!((updated.final_amount - 74_700.0).abs() < 1e-9);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_project_rejects_invalid_values() -> Result<()> {
        let (db, project) = setup_with_project().await?;

        let result = update_project(
            &db,
            &project.id,
            ProjectUpdate {
                fee_percent: Some(101.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidPercentage { .. })));

        let result = update_project(&db, "missing", ProjectUpdate::default()).await;
        assert!(matches!(result, Err(Error::ProjectNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_project_recalculates_on_read() -> Result<()> {
        let (db, project) = setup_with_project().await?;

        let expense =
            create_test_expense(&db, 100.0, Currency::Dollars, &[project.id.as_str()]).await?;

        // Edit the stored amount behind the engine's back; the read must catch up.
        let mut stale: crate::entities::expense::ActiveModel = expense.into();
        stale.amount = Set(50.0);
        stale.update(&db).await?;

        let read = get_project(&db, &project.id).await?.unwrap();
        assert_eq!(read.allocated_expenses, 50.0);
        assert_eq!(read.final_amount, 750.0);

        assert!(get_project(&db, "missing").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_projects_for_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_project(&db, 100.0, Currency::Dollars, 0.0).await?;
        let second = create_test_project(&db, 200.0, Currency::Euro, 50.0).await?;

        let mut other = new_project(999.0, 0.0);
        other.owner_id = "someone_else".to_string();
        create_project(&db, other).await?;

        let projects = list_projects_for_owner(&db, TEST_OWNER).await?;
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().any(|p| p.id == first.id && p.final_amount == 100.0));
        assert!(projects.iter().any(|p| p.id == second.id && p.final_amount == 100.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_project_keeps_expenses() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let expense =
            create_test_expense(&db, 10.0, Currency::Dollars, &[project.id.as_str()]).await?;

        delete_project(&db, &project.id).await?;

        assert!(Project::find_by_id(project.id.clone()).one(&db).await?.is_none());
        assert!(expense_ops::get_expense_by_id(&db, &expense.id).await?.is_some());
        assert!(expense_ops::get_linked_project_ids(&db, &expense.id).await?.is_empty());

        let result = delete_project(&db, &project.id).await;
        assert!(matches!(result, Err(Error::ProjectNotFound { .. })));
        Ok(())
    }
}
