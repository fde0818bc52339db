//! Expense entity - A cost that can be linked to zero or more projects.
//!
//! Links live in the `expense_projects` table. Only active expenses are allocated
//! to projects; cadence matters only for dashboard run-rate normalization.

use crate::core::currency::Currency;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How often an expense recurs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "kebab-case")]
pub enum Cadence {
    /// Billed every month
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Billed every three months
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Billed every six months
    #[sea_orm(string_value = "bi-annual")]
    BiAnnual,
    /// Billed once a year
    #[sea_orm(string_value = "yearly")]
    Yearly,
    /// Billed once
    #[sea_orm(string_value = "one-time")]
    OneTime,
}

/// Lifecycle state of an expense
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ExpenseStatus {
    /// Currently incurred; allocated to linked projects
    #[sea_orm(string_value = "Active")]
    Active,
    /// Stopped; ignored everywhere
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    /// Finished; counted in dashboard run-rates only
    #[sea_orm(string_value = "Completed")]
    Completed,
}

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owner who recorded the expense
    pub owner_id: String,
    /// Stored amount in `currency`, never pre-divided by cadence
    pub amount: f64,
    /// Currency the amount is stored in
    pub currency: Currency,
    /// Payment cadence
    pub cadence: Cadence,
    /// Lifecycle state
    pub status: ExpenseStatus,
    /// Free-form category label (e.g. "software", "hosting")
    pub category: String,
    /// When the expense was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One expense links to many projects
    #[sea_orm(has_many = "super::expense_project::Entity")]
    ExpenseProjects,
}

impl Related<super::expense_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseProjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
