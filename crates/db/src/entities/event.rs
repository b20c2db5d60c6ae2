//! Event entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An event that accepts accreditation requests.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Match description shown in emails, e.g. "Local vs Visita".
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Human-readable date of the event.
    #[sea_orm(nullable)]
    pub event_date: Option<String>,

    #[sea_orm(nullable)]
    pub venue: Option<String>,

    /// Only the active event with the highest id receives intake by default.
    #[sea_orm(default_value = false)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::area::Entity")]
    Area,
    #[sea_orm(has_many = "super::zone::Entity")]
    Zone,
    #[sea_orm(has_many = "super::accreditation::Entity")]
    Accreditation,
}

impl Related<super::area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Area.def()
    }
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Zone.def()
    }
}

impl Related<super::accreditation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accreditation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
