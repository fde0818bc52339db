//! Partner entity - A payee that can be attached to projects with a share percentage.
//!
//! Partners are always referenced by their stable `id`; the name is display-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    /// Stable unique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// When the partner was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Partner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One partner can be assigned to many projects
    #[sea_orm(has_many = "super::project_partner::Entity")]
    ProjectPartners,
}

impl Related<super::project_partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPartners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
