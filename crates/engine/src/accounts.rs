//! Ledger accounts.
//!
//! Every posting targets one of three kinds of [`Account`]:
//!
//! - `Liabilities:Bois:<Boi>`: what a participant owes into the pool
//! - `Expenses:<Category>`: cost sink, one per expense label
//! - `Assets:CoroPago`: the single clearing account, never shown to users
//!
//! The textual path is produced by [`Account::path`] only and read back by
//! [`Account::parse`].

use std::fmt;

use sea_orm::entity::prelude::*;

use crate::{Boi, EngineError, ResultEngine, util::account_component};

const LIABILITIES_PREFIX: &str = "Liabilities:Bois:";
const EXPENSES_PREFIX: &str = "Expenses:";
const CLEARING_PATH: &str = "Assets:CoroPago";

/// Normalized expense label, usable as an account component.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(String);

impl Category {
    /// Normalizes a registry expense label (see the registry docs).
    pub fn from_label(label: &str) -> ResultEngine<Self> {
        account_component(label).map(Self).ok_or_else(|| {
            EngineError::MalformedRegistry(format!("expense label '{label}' has no usable name"))
        })
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Account {
    Liability(Boi),
    Expense(Category),
    Clearing,
}

impl Account {
    /// Textual account path as written in the ledger.
    pub fn path(&self) -> String {
        match self {
            Self::Liability(boi) => format!("{LIABILITIES_PREFIX}{boi}"),
            Self::Expense(category) => format!("{EXPENSES_PREFIX}{category}"),
            Self::Clearing => CLEARING_PATH.to_string(),
        }
    }

    /// Reads back a path produced by [`Account::path`].
    pub fn parse(path: &str) -> ResultEngine<Self> {
        let path = path.trim();
        if path == CLEARING_PATH {
            return Ok(Self::Clearing);
        }
        if let Some(name) = path.strip_prefix(LIABILITIES_PREFIX) {
            return Boi::new(name)
                .map(Self::Liability)
                .map_err(|_| EngineError::Ledger(format!("invalid liability account: {path}")));
        }
        if let Some(name) = path.strip_prefix(EXPENSES_PREFIX)
            && !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Ok(Self::Expense(Category(name.to_string())));
        }
        Err(EngineError::Ledger(format!("unknown account: {path}")))
    }

    pub fn is_clearing(&self) -> bool {
        matches!(self, Self::Clearing)
    }

    /// Last path component, the way accounts are named to users.
    pub fn short_name(&self) -> &str {
        match self {
            Self::Liability(boi) => boi.name(),
            Self::Expense(category) => category.name(),
            Self::Clearing => "CoroPago",
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Opened accounts, one row per `open` directive.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account: String,
    pub opened_on: Date,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::postings::Entity")]
    Postings,
}

impl Related<super::postings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
