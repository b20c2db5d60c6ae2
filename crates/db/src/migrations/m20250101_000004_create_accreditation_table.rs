//! Create accreditation table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_event_table::Event;
use super::m20250101_000003_create_zone_table::Zone;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accreditation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accreditation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accreditation::EventId).integer().not_null())
                    .col(
                        ColumnDef::new(Accreditation::GivenName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accreditation::FirstSurname)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accreditation::SecondSurname).string_len(128))
                    .col(
                        ColumnDef::new(Accreditation::NationalId)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accreditation::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Accreditation::Role).string_len(128).not_null())
                    .col(ColumnDef::new(Accreditation::CredentialType).string_len(64))
                    .col(ColumnDef::new(Accreditation::CredentialNumber).string_len(64))
                    .col(ColumnDef::new(Accreditation::Area).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Accreditation::Company)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accreditation::ZoneId).integer())
                    .col(
                        ColumnDef::new(Accreditation::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Accreditation::RejectionReason).text())
                    .col(
                        ColumnDef::new(Accreditation::SubmitterName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accreditation::SubmitterFirstSurname)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accreditation::SubmitterSecondSurname).string_len(128))
                    .col(
                        ColumnDef::new(Accreditation::SubmitterNationalId)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accreditation::SubmitterEmail)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accreditation::SubmitterPhone).string_len(32))
                    .col(
                        ColumnDef::new(Accreditation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accreditation_event")
                            .from(Accreditation::Table, Accreditation::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accreditation_zone")
                            .from(Accreditation::Table, Accreditation::ZoneId)
                            .to(Zone::Table, Zone::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One RUT per event; duplicate inserts fail the whole batch
        manager
            .create_index(
                Index::create()
                    .name("idx_accreditation_event_national_id")
                    .table(Accreditation::Table)
                    .col(Accreditation::EventId)
                    .col(Accreditation::NationalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accreditation_event_status")
                    .table(Accreditation::Table)
                    .col(Accreditation::EventId)
                    .col(Accreditation::Status)
                    .to_owned(),
            )
            .await?;

        // Quota counting
        manager
            .create_index(
                Index::create()
                    .name("idx_accreditation_event_area_company")
                    .table(Accreditation::Table)
                    .col(Accreditation::EventId)
                    .col(Accreditation::Area)
                    .col(Accreditation::Company)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accreditation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Accreditation {
    Table,
    Id,
    EventId,
    GivenName,
    FirstSurname,
    SecondSurname,
    NationalId,
    Email,
    Role,
    CredentialType,
    CredentialNumber,
    Area,
    Company,
    ZoneId,
    Status,
    RejectionReason,
    SubmitterName,
    SubmitterFirstSurname,
    SubmitterSecondSurname,
    SubmitterNationalId,
    SubmitterEmail,
    SubmitterPhone,
    CreatedAt,
}
