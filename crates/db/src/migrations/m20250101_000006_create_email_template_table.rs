//! Create email_template table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_event_table::Event;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailTemplate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailTemplate::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailTemplate::EventId).integer().not_null())
                    .col(
                        ColumnDef::new(EmailTemplate::TemplateType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailTemplate::ZoneKey)
                            .string_len(16)
                            .not_null()
                            .default("default"),
                    )
                    .col(ColumnDef::new(EmailTemplate::Subject).string_len(256))
                    .col(ColumnDef::new(EmailTemplate::MatchDescription).string_len(256))
                    .col(ColumnDef::new(EmailTemplate::EventDate).string_len(128))
                    .col(ColumnDef::new(EmailTemplate::Venue).string_len(256))
                    .col(ColumnDef::new(EmailTemplate::ArrivalTime).string_len(64))
                    .col(ColumnDef::new(EmailTemplate::StartTime).string_len(64))
                    .col(ColumnDef::new(EmailTemplate::ContactEmail).string_len(254))
                    .col(ColumnDef::new(EmailTemplate::IntroText).text())
                    .col(ColumnDef::new(EmailTemplate::InstructionsText).text())
                    .col(ColumnDef::new(EmailTemplate::GeneralInfoText).text())
                    .col(
                        ColumnDef::new(EmailTemplate::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_template_event")
                            .from(EmailTemplate::Table, EmailTemplate::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_template_key")
                    .table(EmailTemplate::Table)
                    .col(EmailTemplate::EventId)
                    .col(EmailTemplate::TemplateType)
                    .col(EmailTemplate::ZoneKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailTemplate::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailTemplate {
    Table,
    Id,
    EventId,
    TemplateType,
    ZoneKey,
    Subject,
    MatchDescription,
    EventDate,
    Venue,
    ArrivalTime,
    StartTime,
    ContactEmail,
    IntroText,
    InstructionsText,
    GeneralInfoText,
    UpdatedAt,
}
