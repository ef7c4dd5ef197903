//! Transaction postings.
//!
//! A [`Posting`] is a single signed amount booked on an [`Account`] as part of
//! a [`Transaction`](crate::Transaction):
//! - positive values debit the account
//! - negative values credit the account
//!
//! The postings of one transaction always add up to zero.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Account, Currency, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    pub account: Account,
    pub amount: MoneyCents,
}

impl Posting {
    pub fn new(account: Account, amount: MoneyCents) -> Self {
        Self { account, amount }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "postings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub position: i32,
    pub account: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::Account",
        to = "super::accounts::Column::Account",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_posting(transaction_id: i64, position: i32, posting: &Posting) -> Self {
        Self {
            transaction_id: ActiveValue::Set(transaction_id),
            position: ActiveValue::Set(position),
            account: ActiveValue::Set(posting.account.path()),
            amount_minor: ActiveValue::Set(posting.amount.cents()),
            currency: ActiveValue::Set(Currency::Dop.code().to_string()),
        }
    }
}
