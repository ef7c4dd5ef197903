//! Ledger text: rendering synthesized entries and reading them back.
//!
//! The format is the beancount subset the synthesizer needs:
//!
//! ```text
//! 2024-01-01 open Liabilities:Bois:Ana DOP
//!   ordinal: 1
//!
//! 2024-01-01 * "1/2 of food" #Ana
//!   ordinal: 5
//!   Liabilities:Bois:Ana  100.00 DOP
//!   Liabilities:Bois:Beto  -50.00 DOP
//!   Assets:CoroPago  -50.00 DOP
//! ```
//!
//! Text is read with `beancount-parser-lima`. On top of the syntax,
//! [`parse_ledger`] checks what a ledger engine would: accounts are opened
//! once and before use, every posting is in DOP, and every transaction
//! balances. Since the text is generated, any failure here is a bug in
//! synthesis and is reported as [`EngineError::Ledger`].

use std::{
    collections::{BTreeSet, HashMap},
    fmt::{Display, Write as _},
};

use beancount_parser_lima::{
    self as beancount, BeancountParser, BeancountSources, DirectiveVariant, MetaValue,
    ParseError, ParseSuccess, SimpleValue, Spanned,
};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    Account, Boi, Currency, EngineError, Entry, MoneyCents, Open, Posting, ResultEngine,
    Transaction,
};

const ORDINAL_KEY: &str = "ordinal";

/// Render entries as ledger text, each entry followed by a blank line.
pub fn render_ledger(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        // Writing into a String cannot fail.
        let _ = match entry {
            Entry::Open(open) => write_open(&mut out, open),
            Entry::Transaction(tx) => write_transaction(&mut out, tx),
        };
        out.push('\n');
    }
    out
}

fn write_open(out: &mut String, open: &Open) -> std::fmt::Result {
    writeln!(out, "{} open {} {}", open.date, open.account, open.currency)?;
    writeln!(out, "  {ORDINAL_KEY}: {}", open.ordinal)
}

fn write_transaction(out: &mut String, tx: &Transaction) -> std::fmt::Result {
    write!(out, "{} * \"{}\"", tx.date, escape(&tx.narration))?;
    for tag in &tx.tags {
        write!(out, " #{tag}")?;
    }
    out.push('\n');
    writeln!(out, "  {ORDINAL_KEY}: {}", tx.ordinal)?;
    for posting in &tx.postings {
        writeln!(
            out,
            "  {}  {} {}",
            posting.account,
            posting.amount.plain(),
            Currency::Dop
        )?;
    }
    Ok(())
}

/// Narrations stay on one physical line.
fn escape(narration: &str) -> String {
    let mut out = String::with_capacity(narration.len());
    for ch in narration.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch => out.push(ch),
        }
    }
    out
}

/// Parse ledger text produced by [`render_ledger`] and validate it.
///
/// Entries come back in ordinal order, whatever the order of the text.
pub fn parse_ledger(text: &str) -> ResultEngine<Vec<Entry>> {
    let sources = BeancountSources::from(text);
    let parser = BeancountParser::new(&sources);
    let directives = match parser.parse() {
        Ok(ParseSuccess { directives, .. }) => directives,
        Err(ParseError { errors, .. }) => {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(EngineError::Ledger(messages.join("; ")));
        }
    };

    let mut entries = directives
        .iter()
        .map(entry)
        .collect::<ResultEngine<Vec<_>>>()?;
    entries.sort_by_key(Entry::ordinal);
    validate(&entries)?;

    tracing::debug!(entries = entries.len(), "ledger parsed");
    Ok(entries)
}

fn invalid(what: impl Display, message: impl Display) -> EngineError {
    EngineError::Ledger(format!("{what}: {message}"))
}

fn entry(directive: &Spanned<beancount::Directive<'_>>) -> ResultEngine<Entry> {
    let day = directive.date().item();
    let date = NaiveDate::from_ymd_opt(
        day.year(),
        u32::from(u8::from(day.month())),
        u32::from(day.day()),
    )
    .ok_or_else(|| invalid(day, "date out of range"))?;
    let ordinal = ordinal(directive.metadata(), date)?;
    let at = format!("entry {ordinal} ({date})");

    match directive.variant() {
        DirectiveVariant::Open(open) => {
            let account =
                Account::parse(open.account().item().as_ref()).map_err(|err| invalid(&at, err))?;
            let mut currencies = open.currencies();
            let currency = match currencies.next() {
                Some(code) => {
                    let code: &str = code.item().as_ref();
                    Currency::try_from(code).map_err(|err| invalid(&at, err))?
                }
                None => Currency::Dop,
            };
            if currencies.next().is_some() {
                return Err(invalid(&at, "open with more than one currency"));
            }
            Ok(Entry::Open(Open {
                ordinal,
                date,
                account,
                currency,
            }))
        }
        DirectiveVariant::Transaction(tx) => {
            let mut tags = BTreeSet::new();
            for tag in directive.metadata().tags() {
                tags.insert(Boi::new(tag.item().as_ref()).map_err(|err| invalid(&at, err))?);
            }
            let mut postings = Vec::with_capacity(tx.postings().len());
            for posting in tx.postings() {
                let account = Account::parse(posting.account().item().as_ref())
                    .map_err(|err| invalid(&at, err))?;
                let (Some(amount), Some(currency)) = (posting.amount(), posting.currency()) else {
                    return Err(invalid(&at, format!("posting on {account} without amount")));
                };
                let code: &str = currency.item().as_ref();
                Currency::try_from(code).map_err(|err| invalid(&at, err))?;
                let amount =
                    MoneyCents::exact(amount.item().value()).map_err(|err| invalid(&at, err))?;
                postings.push(Posting::new(account, amount));
            }
            Ok(Entry::Transaction(Transaction {
                ordinal,
                date,
                tags,
                narration: tx
                    .narration()
                    .map(|narration| narration.item().to_string())
                    .unwrap_or_default(),
                postings,
            }))
        }
        _ => Err(invalid(at, "unsupported directive")),
    }
}

fn ordinal(metadata: &beancount::Metadata<'_>, date: NaiveDate) -> ResultEngine<u64> {
    let value = metadata
        .key_values()
        .find(|(key, _)| *key.item() == ORDINAL_KEY)
        .map(|(_, value)| value.item())
        .ok_or_else(|| invalid(date, "entry without ordinal"))?;
    match value {
        MetaValue::Simple(SimpleValue::Expr(expr)) if expr.value().fract().is_zero() => expr
            .value()
            .to_u64()
            .filter(|ordinal| *ordinal > 0)
            .ok_or_else(|| invalid(date, format!("invalid ordinal {value}"))),
        _ => Err(invalid(date, format!("invalid ordinal {value}"))),
    }
}

/// Ledger-engine checks over entries in ordinal order.
fn validate(entries: &[Entry]) -> ResultEngine<()> {
    for pair in entries.windows(2) {
        if pair[0].ordinal() == pair[1].ordinal() {
            return Err(invalid(
                format!("entry {}", pair[1].ordinal()),
                "ordinal used twice",
            ));
        }
    }

    let mut opened: HashMap<&Account, NaiveDate> = HashMap::new();
    for entry in entries {
        if let Entry::Open(open) = entry
            && opened.insert(&open.account, open.date).is_some()
        {
            return Err(invalid(
                format!("entry {}", open.ordinal),
                format!("account {} opened twice", open.account),
            ));
        }
    }

    for tx in entries.iter().filter_map(Entry::as_transaction) {
        let at = format!("entry {} ({})", tx.ordinal, tx.date);
        for posting in &tx.postings {
            match opened.get(&posting.account) {
                Some(opened_on) if *opened_on <= tx.date => {}
                Some(opened_on) => {
                    return Err(invalid(
                        &at,
                        format!("{} used before it opens on {opened_on}", posting.account),
                    ));
                }
                None => return Err(invalid(&at, format!("{} is not open", posting.account))),
            }
        }
        tx.ensure_balanced().map_err(|err| invalid(&at, err))?;
    }
    Ok(())
}
