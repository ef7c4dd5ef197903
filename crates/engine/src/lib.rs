//! Shared-expense ledger engine.
//!
//! Turns a [`Registry`] of expenses and payments among a group of bois into a
//! balanced double-entry ledger and answers "who owes whom, and why":
//!
//! 1. [`Registry::from_path`] reads and validates the registry.
//! 2. [`synthesize`] builds the ledger entries, splitting every expense with
//!    [`DebtSplit`].
//! 3. [`render_ledger`] / [`parse_ledger`] convert entries to and from ledger
//!    text.
//! 4. [`Engine::load`] stores the entries and [`Engine::balances`] queries and
//!    aggregates them.

pub use accounts::{Account, Category};
pub use balances::{
    BalanceLine, Debt, DebtRow, PositionRow, Reason, aggregate, aggregate_debts, net_pairwise,
};
pub use currency::Currency;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, PositionQuery};
pub use postings::Posting;
pub use registry::{Boi, Expense, Payment, Registry};
pub use split::DebtSplit;
pub use synth::{Synthesizer, synthesize};
pub use text::{parse_ledger, render_ledger};
pub use transactions::{Entry, Open, Transaction};

mod accounts;
mod balances;
mod currency;
mod error;
mod money;
mod ops;
mod postings;
mod registry;
mod split;
mod synth;
mod tags;
mod text;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
