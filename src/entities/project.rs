//! Project entity - A freelance project and its persisted waterfall aggregate.
//!
//! The input columns (`price`, `currency`, `fee_percent`, `charity_enabled`) are
//! user-editable. The derived columns are written only by the recalculation engine.

use crate::core::currency::Currency;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owner who created the project
    pub owner_id: String,
    /// Human-readable project name
    pub name: String,
    /// Gross price in the project currency
    pub price: f64,
    /// Currency the project is billed in
    pub currency: Currency,
    /// Platform fee percentage (0-100)
    pub fee_percent: f64,
    /// Whether the 5% charity deduction applies
    pub charity_enabled: bool,
    /// Derived: `price * fee_percent / 100`
    pub platform_fee_amount: f64,
    /// Derived: price minus platform fee
    pub after_platform_fee: f64,
    /// Derived: linked active expenses in the project currency
    pub allocated_expenses: f64,
    /// Derived: after platform fee minus allocated expenses
    pub after_expenses: f64,
    /// Derived: charity deduction
    pub charity_amount: f64,
    /// Derived: after expenses minus charity
    pub after_charity: f64,
    /// Derived: non-negative distributable amount
    pub final_amount: f64,
    /// Derived: total paid out across all partners
    pub partner_share_amount: f64,
    /// When the project was created
    pub created_at: DateTimeUtc,
    /// When the project inputs were last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One project has many partner assignments
    #[sea_orm(has_many = "super::project_partner::Entity")]
    ProjectPartners,
    /// One project has many expense links
    #[sea_orm(has_many = "super::expense_project::Entity")]
    ExpenseProjects,
    /// One project has many withdrawal links
    #[sea_orm(has_many = "super::withdrawal_project::Entity")]
    WithdrawalProjects,
}

impl Related<super::project_partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPartners.def()
    }
}

impl Related<super::expense_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseProjects.def()
    }
}

impl Related<super::withdrawal_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WithdrawalProjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
