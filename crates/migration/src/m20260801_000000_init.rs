//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Teilen:
//!
//! - `users`: accounts (username is the primary key)
//! - `expense_groups`: shared-expense circles ("groups" is reserved in SQL)
//! - `group_members`: who belongs to which group
//! - `expenses`: one paid amount per row, split strategy recorded
//! - `debts`: the per-expense ledger rows (obligations and the payer's claim)
//! - `payments`: per-(expense, user) settlement flags
//! - `friends`: directional friend links

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Name,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseGroups {
    Table,
    Id,
    Name,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum GroupMembers {
    Table,
    GroupId,
    Username,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    GroupId,
    AmountCents,
    Description,
    Category,
    PaidBy,
    SplitKind,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Debts {
    Table,
    Id,
    ExpenseId,
    Username,
    Kind,
    AmountCents,
}

#[derive(Iden)]
enum Payments {
    Table,
    ExpenseId,
    Username,
    Paid,
    PaidAt,
}

#[derive(Iden)]
enum Friends {
    Table,
    Username,
    FriendUsername,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseGroups::Name).string().not_null())
                    .col(ColumnDef::new(ExpenseGroups::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseGroups::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_groups-created_by")
                            .from(ExpenseGroups::Table, ExpenseGroups::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupMembers::GroupId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::Username).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(GroupMembers::GroupId)
                            .col(GroupMembers::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(ExpenseGroups::Table, ExpenseGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-username")
                            .from(GroupMembers::Table, GroupMembers::Username)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::GroupId).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string())
                    .col(ColumnDef::new(Expenses::PaidBy).string().not_null())
                    .col(ColumnDef::new(Expenses::SplitKind).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-group_id")
                            .from(Expenses::Table, Expenses::GroupId)
                            .to(ExpenseGroups::Table, ExpenseGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-paid_by")
                            .from(Expenses::Table, Expenses::PaidBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Debts::ExpenseId).string().not_null())
                    .col(ColumnDef::new(Debts::Username).string().not_null())
                    .col(ColumnDef::new(Debts::Kind).string().not_null())
                    .col(ColumnDef::new(Debts::AmountCents).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-expense_id")
                            .from(Debts::Table, Debts::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-username")
                            .from(Debts::Table, Debts::Username)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-expense_id")
                    .table(Debts::Table)
                    .col(Debts::ExpenseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-username")
                    .table(Debts::Table)
                    .col(Debts::Username)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::ExpenseId).string().not_null())
                    .col(ColumnDef::new(Payments::Username).string().not_null())
                    .col(ColumnDef::new(Payments::Paid).boolean().not_null())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp())
                    .primary_key(
                        Index::create()
                            .col(Payments::ExpenseId)
                            .col(Payments::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-expense_id")
                            .from(Payments::Table, Payments::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Friends::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Friends::Username).string().not_null())
                    .col(ColumnDef::new(Friends::FriendUsername).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(Friends::Username)
                            .col(Friends::FriendUsername),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-friends-username")
                            .from(Friends::Table, Friends::Username)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-friends-friend_username")
                            .from(Friends::Table, Friends::FriendUsername)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friends::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
