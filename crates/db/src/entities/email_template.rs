//! Email template override entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which notification a template renders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    #[sea_orm(string_value = "approval")]
    Approval,
    #[sea_orm(string_value = "rejection")]
    Rejection,
}

/// Template variant. Only the field zone has its own access logistics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ZoneKey {
    #[sea_orm(string_value = "cancha")]
    Cancha,
    #[sea_orm(string_value = "default")]
    #[default]
    Default,
}

/// Per-event overrides for email copy. Every text field is optional; absent
/// fields fall back to built-in defaults.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_template")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: i32,

    pub template_type: TemplateType,

    pub zone_key: ZoneKey,

    #[sea_orm(nullable)]
    pub subject: Option<String>,
    #[sea_orm(nullable)]
    pub match_description: Option<String>,
    #[sea_orm(nullable)]
    pub event_date: Option<String>,
    #[sea_orm(nullable)]
    pub venue: Option<String>,
    #[sea_orm(nullable)]
    pub arrival_time: Option<String>,
    #[sea_orm(nullable)]
    pub start_time: Option<String>,
    #[sea_orm(nullable)]
    pub contact_email: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub intro_text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub instructions_text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub general_info_text: Option<String>,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
