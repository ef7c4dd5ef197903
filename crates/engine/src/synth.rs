//! Transaction synthesis: registry in, ordered ledger entries out.
//!
//! Entry order:
//!
//! 1. `open` for every boi, in declaration order
//! 2. `open` for the clearing account
//! 3. `open` for every expense category, first-seen order
//! 4. per expense: the raw cost transaction, then its debt split
//! 5. per payment: the settlement transaction
//!
//! Accounts are opened on the earliest date of the registry. Everything is
//! computed before anything is returned, so a failing expense never leaves a
//! partial ledger behind.

use std::collections::{BTreeSet, HashSet};

use crate::{
    Account, Currency, DebtSplit, Entry, Expense, Open, Payment, Posting, Registry, ResultEngine,
    Transaction,
};

/// Synthesize the ledger for `registry`.
///
/// Every call starts its own ordinal counter at 1, so repeated calls over the
/// same registry produce identical entries.
pub fn synthesize(registry: &Registry) -> ResultEngine<Vec<Entry>> {
    Synthesizer::default().run(registry)
}

/// Per-pass synthesis state.
#[derive(Debug, Default)]
pub struct Synthesizer {
    counter: u64,
}

impl Synthesizer {
    fn next_ordinal(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Consume the synthesizer and build the entries of `registry`.
    pub fn run(mut self, registry: &Registry) -> ResultEngine<Vec<Entry>> {
        let Some(opened_on) = registry.earliest_date() else {
            tracing::debug!("registry has no records, nothing to synthesize");
            return Ok(Vec::new());
        };

        let mut categories = Vec::new();
        let mut seen = HashSet::new();
        for expense in &registry.expenses {
            if seen.insert(&expense.category) {
                categories.push(Account::Expense(expense.category.clone()));
            }
        }

        let accounts = registry
            .bois
            .iter()
            .map(|boi| Account::Liability(boi.clone()))
            .chain(std::iter::once(Account::Clearing))
            .chain(categories);

        let mut entries = Vec::with_capacity(
            registry.bois.len() + 1 + seen.len() + registry.expenses.len() * 2 + registry.payments.len(),
        );
        for account in accounts {
            entries.push(Entry::Open(Open {
                ordinal: self.next_ordinal(),
                date: opened_on,
                account,
                currency: Currency::Dop,
            }));
        }

        for expense in &registry.expenses {
            let raw = self.raw_cost(expense);
            raw.ensure_balanced()?;
            let split = DebtSplit::of(expense)?;
            let debt = split.into_transaction(self.next_ordinal(), expense)?;
            entries.push(Entry::Transaction(raw));
            entries.push(Entry::Transaction(debt));
        }

        for payment in &registry.payments {
            let tx = self.payment(payment);
            tx.ensure_balanced()?;
            entries.push(Entry::Transaction(tx));
        }

        tracing::debug!(
            entries = entries.len(),
            last_ordinal = self.counter,
            "ledger synthesized"
        );
        Ok(entries)
    }

    /// Payer's liability credited, expense category debited.
    fn raw_cost(&mut self, expense: &Expense) -> Transaction {
        Transaction {
            ordinal: self.next_ordinal(),
            date: expense.when,
            tags: BTreeSet::from([expense.who.clone()]),
            narration: expense
                .description
                .clone()
                .unwrap_or_else(|| expense.expense.clone()),
            postings: vec![
                Posting::new(Account::Liability(expense.who.clone()), -expense.amount),
                Posting::new(Account::Expense(expense.category.clone()), expense.amount),
            ],
        }
    }

    /// Payer's liability debited against the clearing account; tagged with
    /// the receiver, whose balance the payment settles.
    fn payment(&mut self, payment: &Payment) -> Transaction {
        Transaction {
            ordinal: self.next_ordinal(),
            date: payment.when,
            tags: BTreeSet::from([payment.to.clone()]),
            narration: format!("payment from {} to {}", payment.who, payment.to),
            postings: vec![
                Posting::new(Account::Liability(payment.who.clone()), payment.amount),
                Posting::new(Account::Clearing, -payment.amount),
            ],
        }
    }
}
