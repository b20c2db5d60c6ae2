//! Email send log entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::email_template::TemplateType;

/// Delivery state reported by the provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "delayed")]
    Delayed,
    #[sea_orm(string_value = "complained")]
    Complained,
    #[sea_orm(string_value = "bounced")]
    Bounced,
    #[sea_orm(string_value = "opened")]
    Opened,
    #[sea_orm(string_value = "clicked")]
    Clicked,
    /// The provider refused the message at send time.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// One row per send attempt, later updated by delivery webhooks.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Accreditation the email was about. Null when the row was created by a
    /// webhook that arrived before the send was logged.
    #[sea_orm(nullable, indexed)]
    pub accreditation_id: Option<String>,

    pub recipient: String,

    #[sea_orm(nullable)]
    pub template_type: Option<TemplateType>,

    /// Message id returned by the provider.
    #[sea_orm(unique, nullable)]
    pub provider_message_id: Option<String>,

    pub status: DeliveryStatus,

    /// Bounce or send failure detail.
    #[sea_orm(column_type = "Text", nullable)]
    pub detail: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
