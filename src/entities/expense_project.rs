//! Expense project entity - Links an expense to a project it is allocated against.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense-to-project link model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_projects")]
pub struct Model {
    /// Linked expense
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    /// Project the expense is allocated against
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
}

/// Defines relationships between `ExpenseProject` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
    /// Each link belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
