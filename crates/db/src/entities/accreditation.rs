//! Accreditation request entity.
//!
//! One row per individual to be accredited. Submitter contact data is
//! denormalized onto every row of a batch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of an accreditation request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AccreditationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl AccreditationStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a wire name. Spanish labels used by older clients are accepted too.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Some(Self::Pending),
            "approved" | "aprobado" => Some(Self::Approved),
            "rejected" | "rechazado" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether reaching this status notifies the applicant.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for AccreditationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accreditation request.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accreditation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: i32,

    // === Identity ===
    pub given_name: String,
    pub first_surname: String,
    #[sea_orm(nullable)]
    pub second_surname: Option<String>,
    /// RUT, unique per event.
    pub national_id: String,
    pub email: String,
    /// Free-text role/title (cargo).
    pub role: String,
    #[sea_orm(nullable)]
    pub credential_type: Option<String>,
    #[sea_orm(nullable)]
    pub credential_number: Option<String>,

    // === Classification ===
    /// Area code, matched case-insensitively.
    pub area: String,
    /// Company/outlet name, matched case-insensitively.
    pub company: String,

    // === Assignment ===
    /// Null means unassigned.
    #[sea_orm(nullable)]
    pub zone_id: Option<i32>,

    // === Lifecycle ===
    pub status: AccreditationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    // === Submitter (denormalized) ===
    pub submitter_name: String,
    pub submitter_first_surname: String,
    #[sea_orm(nullable)]
    pub submitter_second_surname: Option<String>,
    pub submitter_national_id: String,
    pub submitter_email: String,
    #[sea_orm(nullable)]
    pub submitter_phone: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Given name and surnames joined with single spaces.
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut name = format!("{} {}", self.given_name, self.first_surname);
        if let Some(second) = self.second_surname.as_deref().filter(|s| !s.trim().is_empty()) {
            name.push(' ');
            name.push_str(second);
        }
        name
    }
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
    #[sea_orm(
        belongs_to = "super::zone::Entity",
        from = "Column::ZoneId",
        to = "super::zone::Column::Id",
        on_delete = "SetNull"
    )]
    Zone,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Zone.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
