//! The registry: participants, expenses and payments as declared in the JSON
//! file.
//!
//! The registry is validated eagerly: once a [`Registry`] exists every boi
//! referenced by an expense or a payment is known, every amount is a positive
//! number of cents and every expense label maps to an account component.
//! Nothing downstream has to check membership again.

use std::{borrow::Borrow, collections::HashSet, fmt, path::Path};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{Category, EngineError, MoneyCents, ResultEngine};

/// A participant of the group.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Boi(String);

impl Boi {
    /// Validates a participant name.
    ///
    /// Names end up verbatim in account paths (`Liabilities:Bois:<name>`) and
    /// tags (`#<name>`), so they follow the ledger's account component rules:
    /// an ASCII capital letter or digit, then ASCII letters, digits or `-`.
    pub fn new(name: &str) -> ResultEngine<Self> {
        let name = name.trim();
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(EngineError::MalformedRegistry(
                "boi name must not be empty".to_string(),
            ));
        };
        if !(first.is_ascii_uppercase() || first.is_ascii_digit())
            || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(EngineError::MalformedRegistry(format!(
                "invalid boi name '{name}': use a capital letter or digit, then letters, digits or '-'"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Boi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Boi {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Money `who` spent on behalf of `split_between` and themself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub who: Boi,
    pub amount: MoneyCents,
    /// Expense label as written in the registry.
    pub expense: String,
    pub category: Category,
    pub when: NaiveDate,
    /// Other members of the group, first-seen order, without duplicates.
    pub split_between: Vec<Boi>,
    pub description: Option<String>,
}

impl Expense {
    /// `split_between ∪ {who}`, payer first.
    pub fn group(&self) -> Vec<&Boi> {
        let mut group = vec![&self.who];
        for boi in &self.split_between {
            if !group.contains(&boi) {
                group.push(boi);
            }
        }
        group
    }
}

/// Settlement `who` paid to `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub who: Boi,
    pub to: Boi,
    pub amount: MoneyCents,
    pub when: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct RawRegistry {
    bois: Vec<String>,
    #[serde(default)]
    expenses: Vec<RawExpense>,
    #[serde(default)]
    payments: Vec<RawPayment>,
}

#[derive(Debug, Deserialize)]
struct RawExpense {
    who: String,
    amount: Decimal,
    expense: String,
    when: NaiveDate,
    #[serde(default)]
    split_between: Vec<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPayment {
    who: String,
    to: String,
    amount: Decimal,
    when: NaiveDate,
}

/// Root aggregate, read-only for the whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    pub bois: Vec<Boi>,
    pub expenses: Vec<Expense>,
    pub payments: Vec<Payment>,
}

impl Registry {
    /// Reads and validates a registry file.
    pub fn from_path(path: impl AsRef<Path>) -> ResultEngine<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            EngineError::MalformedRegistry(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a registry from its JSON text.
    pub fn from_json(content: &str) -> ResultEngine<Self> {
        let raw: RawRegistry = serde_json::from_str(content)
            .map_err(|err| EngineError::MalformedRegistry(err.to_string()))?;
        let registry = Self::try_from(raw)?;
        tracing::debug!(
            bois = registry.bois.len(),
            expenses = registry.expenses.len(),
            payments = registry.payments.len(),
            "registry loaded"
        );
        Ok(registry)
    }

    /// Resolves a declared participant by name.
    pub fn boi(&self, name: &str) -> ResultEngine<&Boi> {
        self.bois
            .iter()
            .find(|boi| boi.name() == name.trim())
            .ok_or_else(|| EngineError::UnknownParticipant(name.trim().to_string()))
    }

    /// Earliest date among all expenses and payments, `None` for a registry
    /// without records.
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.expenses
            .iter()
            .map(|expense| expense.when)
            .chain(self.payments.iter().map(|payment| payment.when))
            .min()
    }
}

impl TryFrom<RawRegistry> for Registry {
    type Error = EngineError;

    fn try_from(raw: RawRegistry) -> Result<Self, Self::Error> {
        let mut bois = Vec::with_capacity(raw.bois.len());
        let mut seen = HashSet::new();
        for name in &raw.bois {
            let boi = Boi::new(name)?;
            if !seen.insert(boi.clone()) {
                return Err(EngineError::MalformedRegistry(format!(
                    "boi declared twice: {boi}"
                )));
            }
            bois.push(boi);
        }

        let resolve = |name: &str| -> ResultEngine<Boi> {
            seen.get(name.trim())
                .cloned()
                .ok_or_else(|| EngineError::UnknownParticipant(name.trim().to_string()))
        };

        let mut expenses = Vec::with_capacity(raw.expenses.len());
        for raw_expense in raw.expenses {
            let who = resolve(&raw_expense.who)?;
            let mut split_between: Vec<Boi> = Vec::with_capacity(raw_expense.split_between.len());
            for name in &raw_expense.split_between {
                let boi = resolve(name)?;
                if !split_between.contains(&boi) {
                    split_between.push(boi);
                }
            }
            let amount = MoneyCents::from_decimal(raw_expense.amount)?;
            if !amount.is_positive() {
                return Err(EngineError::InvalidSplit(format!(
                    "expense '{}' paid by {who} must be positive, got {amount}",
                    raw_expense.expense
                )));
            }
            let category = Category::from_label(&raw_expense.expense)?;
            expenses.push(Expense {
                who,
                amount,
                expense: raw_expense.expense,
                category,
                when: raw_expense.when,
                split_between,
                description: raw_expense
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            });
        }

        let mut payments = Vec::with_capacity(raw.payments.len());
        for raw_payment in raw.payments {
            let who = resolve(&raw_payment.who)?;
            let to = resolve(&raw_payment.to)?;
            if who == to {
                return Err(EngineError::MalformedRegistry(format!(
                    "payment from {who} to themself"
                )));
            }
            let amount = MoneyCents::from_decimal(raw_payment.amount)?;
            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(format!(
                    "payment from {who} to {to} must be positive, got {amount}"
                )));
            }
            payments.push(Payment {
                who,
                to,
                amount,
                when: raw_payment.when,
            });
        }

        Ok(Self {
            bois,
            expenses,
            payments,
        })
    }
}
