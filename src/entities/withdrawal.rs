//! Withdrawal entity - A cash-out event against one or more projects.
//!
//! Withdrawals feed the portfolio balance, never the per-project waterfall.

use crate::core::currency::Currency;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owner who withdrew
    pub owner_id: String,
    /// Amount withdrawn in `currency`
    pub amount: f64,
    /// Currency of the withdrawal
    pub currency: Currency,
    /// Optional free-form note
    pub note: Option<String>,
    /// When the money was withdrawn
    pub withdrawn_at: DateTimeUtc,
}

/// Defines relationships between Withdrawal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One withdrawal links to many projects
    #[sea_orm(has_many = "super::withdrawal_project::Entity")]
    WithdrawalProjects,
}

impl Related<super::withdrawal_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WithdrawalProjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
