//! Withdrawal project entity - Links a withdrawal to a project it draws from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal-to-project link model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_projects")]
pub struct Model {
    /// Linked withdrawal
    #[sea_orm(primary_key, auto_increment = false)]
    pub withdrawal_id: String,
    /// Project the withdrawal draws from
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
}

/// Defines relationships between `WithdrawalProject` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one withdrawal
    #[sea_orm(
        belongs_to = "super::withdrawal::Entity",
        from = "Column::WithdrawalId",
        to = "super::withdrawal::Column::Id"
    )]
    Withdrawal,
    /// Each link belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::withdrawal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawal.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
