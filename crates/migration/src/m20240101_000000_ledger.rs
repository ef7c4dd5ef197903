//! Ledger schema.
//!
//! The store mirrors the rendered ledger text one to one:
//!
//! - `accounts`: one row per `open` directive
//! - `ledger_transactions`: one row per transaction, keyed by its ordinal
//! - `postings`: the balanced postings of each transaction, in order
//! - `transaction_tags`: the participants a transaction is tagged with

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Account,
    OpenedOn,
    Currency,
}

#[derive(Iden)]
enum LedgerTransactions {
    Table,
    Id,
    Date,
    Narration,
}

#[derive(Iden)]
enum Postings {
    Table,
    TransactionId,
    Position,
    Account,
    AmountMinor,
    Currency,
}

#[derive(Iden)]
enum TransactionTags {
    Table,
    TransactionId,
    Boi,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Account)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::OpenedOn).date().not_null())
                    .col(
                        ColumnDef::new(Accounts::Currency)
                            .string()
                            .not_null()
                            .default("DOP"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(LedgerTransactions::Narration)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-date")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Postings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Postings::TransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Postings::Position).integer().not_null())
                    .col(ColumnDef::new(Postings::Account).string().not_null())
                    .col(
                        ColumnDef::new(Postings::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Postings::Currency)
                            .string()
                            .not_null()
                            .default("DOP"),
                    )
                    .primary_key(
                        Index::create()
                            .col(Postings::TransactionId)
                            .col(Postings::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-postings-transaction_id")
                            .from(Postings::Table, Postings::TransactionId)
                            .to(LedgerTransactions::Table, LedgerTransactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-postings-account")
                            .from(Postings::Table, Postings::Account)
                            .to(Accounts::Table, Accounts::Account),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-postings-account")
                    .table(Postings::Table)
                    .col(Postings::Account)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionTags::TransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionTags::Boi).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(TransactionTags::TransactionId)
                            .col(TransactionTags::Boi),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_tags-transaction_id")
                            .from(TransactionTags::Table, TransactionTags::TransactionId)
                            .to(LedgerTransactions::Table, LedgerTransactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_tags-boi")
                    .table(TransactionTags::Table)
                    .col(TransactionTags::Boi)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Postings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
