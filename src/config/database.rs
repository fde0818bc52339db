//! Database configuration module for `PayoutLedger`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Referenced tables are created before the
//! link tables that point at them.

use crate::entities::{
    Expense, ExpenseProject, Partner, Project, ProjectPartner, Withdrawal, WithdrawalProject,
    expense_project, withdrawal_project,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info};

/// Default database location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/payout_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!(%database_url, "Connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all ledger tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Project).await?;
    create_table(db, &schema, Partner).await?;
    create_table(db, &schema, Expense).await?;
    create_table(db, &schema, Withdrawal).await?;
    create_table(db, &schema, ProjectPartner).await?;
    create_table(db, &schema, ExpenseProject).await?;
    create_table(db, &schema, WithdrawalProject).await?;

    // Link keys lead with the record id; recalculation looks links up by project.
    let builder = db.get_database_backend();
    let expense_index = Index::create()
        .if_not_exists()
        .name("idx_expense_projects_project_id")
        .table(ExpenseProject)
        .col(expense_project::Column::ProjectId)
        .to_owned();
    db.execute(builder.build(&expense_index)).await?;
    let withdrawal_index = Index::create()
        .if_not_exists()
        .name("idx_withdrawal_projects_project_id")
        .table(WithdrawalProject)
        .col(withdrawal_project::Column::ProjectId)
        .to_owned();
    db.execute(builder.build(&withdrawal_index)).await?;

    info!("Database tables are in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        ExpenseModel, PartnerModel, ProjectModel, ProjectPartnerModel, WithdrawalModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<ProjectModel> = Project::find().limit(1).all(&db).await?;
        let _: Vec<PartnerModel> = Partner::find().limit(1).all(&db).await?;
        let _: Vec<ExpenseModel> = Expense::find().limit(1).all(&db).await?;
        let _: Vec<WithdrawalModel> = Withdrawal::find().limit(1).all(&db).await?;
        let _: Vec<ProjectPartnerModel> = ProjectPartner::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_default_database_url_is_sqlite() {
        assert!(DEFAULT_DATABASE_URL.starts_with("sqlite://"));
    }
}
