//! Project partner entity - A partner's share of one project.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project partner database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_partners")]
pub struct Model {
    /// Project the share belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
    /// Partner receiving the share
    #[sea_orm(primary_key, auto_increment = false)]
    pub partner_id: String,
    /// Share of the project's final amount (0-100)
    pub share_percent: f64,
    /// Derived: `final_amount * share_percent / 100`
    pub share_amount: f64,
}

/// Defines relationships between `ProjectPartner` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each share belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    /// Each share belongs to one partner
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::PartnerId",
        to = "super::partner::Column::Id"
    )]
    Partner,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
