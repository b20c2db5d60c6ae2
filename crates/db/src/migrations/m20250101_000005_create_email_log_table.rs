//! Create email_log table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailLog::AccreditationId).string_len(32))
                    .col(ColumnDef::new(EmailLog::Recipient).string_len(254).not_null())
                    .col(ColumnDef::new(EmailLog::TemplateType).string_len(16))
                    .col(
                        ColumnDef::new(EmailLog::ProviderMessageId)
                            .string_len(128)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EmailLog::Status)
                            .string_len(16)
                            .not_null()
                            .default("sent"),
                    )
                    .col(ColumnDef::new(EmailLog::Detail).text())
                    .col(
                        ColumnDef::new(EmailLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(EmailLog::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_log_accreditation_id")
                    .table(EmailLog::Table)
                    .col(EmailLog::AccreditationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailLog {
    Table,
    Id,
    AccreditationId,
    Recipient,
    TemplateType,
    ProviderMessageId,
    Status,
    Detail,
    CreatedAt,
    UpdatedAt,
}
