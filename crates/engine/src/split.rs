//! Debt splitting.
//!
//! An expense paid by `who` is shared by `split_between ∪ {who}`. With `n`
//! members the share is `amount / n` rounded to whole cents, midpoints away
//! from zero. The booked postings are:
//!
//! | account                  | amount                      |
//! |--------------------------|-----------------------------|
//! | `Liabilities:Bois:<who>` | `+amount`                   |
//! | `Liabilities:Bois:<x>`   | `-share` for every other x  |
//! | `Assets:CoroPago`        | `-(amount - share*(n-1))`   |
//!
//! The clearing posting absorbs the rounding residual, so the transaction
//! balances exactly whatever `n` is.

use std::collections::BTreeSet;

use crate::{
    Account, EngineError, Expense, MoneyCents, Posting, ResultEngine, Transaction,
};

/// The computed split of one expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebtSplit {
    /// Number of members sharing the expense, payer included.
    pub parts: usize,
    pub share: MoneyCents,
    /// `amount - share * (parts - 1)`, booked on the clearing account.
    pub residual: MoneyCents,
    pub narration: String,
    pub postings: Vec<Posting>,
}

impl DebtSplit {
    /// Computes the split of `expense`.
    pub fn of(expense: &Expense) -> ResultEngine<Self> {
        if !expense.amount.is_positive() {
            return Err(EngineError::InvalidSplit(format!(
                "expense '{}' paid by {} must be positive, got {}",
                expense.expense, expense.who, expense.amount
            )));
        }
        let group = expense.group();
        let parts = group.len();
        if parts == 0 {
            return Err(EngineError::InvalidSplit(format!(
                "expense '{}' has nobody to split between",
                expense.expense
            )));
        }

        let overflow = || EngineError::InvalidSplit("split overflows".to_string());
        let share = expense.amount.share(parts)?;
        let debtors = i64::try_from(parts - 1).map_err(|_| overflow())?;
        let residual = share
            .checked_mul(debtors)
            .and_then(|owed| expense.amount.checked_sub(owed))
            .ok_or_else(overflow)?;

        let mut postings = Vec::with_capacity(parts + 1);
        postings.push(Posting::new(
            Account::Liability(expense.who.clone()),
            expense.amount,
        ));
        for boi in group.into_iter().skip(1) {
            postings.push(Posting::new(Account::Liability(boi.clone()), -share));
        }
        postings.push(Posting::new(Account::Clearing, -residual));

        Ok(Self {
            parts,
            share,
            residual,
            narration: format!("1/{parts} of {}", expense.expense),
            postings,
        })
    }

    /// Wraps the split into a transaction dated and tagged like the expense.
    pub fn into_transaction(self, ordinal: u64, expense: &Expense) -> ResultEngine<Transaction> {
        let tx = Transaction {
            ordinal,
            date: expense.when,
            tags: BTreeSet::from([expense.who.clone()]),
            narration: self.narration,
            postings: self.postings,
        };
        tx.ensure_balanced()?;
        Ok(tx)
    }
}
