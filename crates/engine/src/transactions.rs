//! Ledger entries.
//!
//! An [`Entry`] is either an account [`Open`] directive or a balanced
//! [`Transaction`]. Both carry an `ordinal`: a strictly increasing counter
//! assigned during synthesis, used for stable ordering only.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Account, Boi, Currency, EngineError, MoneyCents, Posting, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Open {
    pub ordinal: u64,
    pub date: NaiveDate,
    pub account: Account,
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub ordinal: u64,
    pub date: NaiveDate,
    pub tags: BTreeSet<Boi>,
    pub narration: String,
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Sum of all posting amounts; zero for a balanced transaction.
    pub fn total(&self) -> MoneyCents {
        self.postings.iter().map(|posting| posting.amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total().is_zero()
    }

    /// Check the double-entry invariants: at least two postings summing to
    /// zero.
    pub fn ensure_balanced(&self) -> ResultEngine<()> {
        if self.postings.len() < 2 {
            return Err(EngineError::Ledger(format!(
                "transaction '{}' on {} has {} posting(s)",
                self.narration,
                self.date,
                self.postings.len()
            )));
        }
        let total = self.total();
        if !total.is_zero() {
            return Err(EngineError::Ledger(format!(
                "transaction '{}' on {} does not balance: off by {total}",
                self.narration, self.date
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Open(Open),
    Transaction(Transaction),
}

impl Entry {
    pub fn ordinal(&self) -> u64 {
        match self {
            Self::Open(open) => open.ordinal,
            Self::Transaction(tx) => tx.ordinal,
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(tx) => Some(tx),
            Self::Open(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub date: Date,
    pub narration: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::postings::Entity")]
    Postings,
    #[sea_orm(has_many = "super::tags::Entity")]
    Tags,
}

impl Related<super::postings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Transaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(ordinal_id(tx.ordinal)?),
            date: ActiveValue::Set(tx.date),
            narration: ActiveValue::Set(tx.narration.clone()),
        })
    }
}

/// Ordinals are stored as SQLite integers.
pub(crate) fn ordinal_id(ordinal: u64) -> ResultEngine<i64> {
    i64::try_from(ordinal)
        .map_err(|_| EngineError::Ledger(format!("ordinal {ordinal} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amounts: &[i64]) -> Transaction {
        Transaction {
            ordinal: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            tags: BTreeSet::new(),
            narration: "test".to_string(),
            postings: amounts
                .iter()
                .map(|cents| Posting::new(Account::Clearing, MoneyCents::new(*cents)))
                .collect(),
        }
    }

    #[test]
    fn balanced_transaction_passes() {
        assert!(tx(&[100, -60, -40]).ensure_balanced().is_ok());
    }

    #[test]
    fn unbalanced_transaction_fails() {
        let tx = tx(&[100, -60]);
        assert!(!tx.is_balanced());
        assert!(matches!(tx.ensure_balanced(), Err(EngineError::Ledger(_))));
    }

    #[test]
    fn single_posting_fails_even_if_zero() {
        assert!(matches!(
            tx(&[0]).ensure_balanced(),
            Err(EngineError::Ledger(_))
        ));
    }
}
