//! Balance aggregation.
//!
//! Query rows come back one per `(account, narration)` group. This module
//! folds them into one [`BalanceLine`] per account, keeping the narrations as
//! itemized [`Reason`]s:
//!
//! - `Assets:CoroPago` is plumbing and never shows up.
//! - Liability nets are sign-flipped: a positive net means that boi owes the
//!   queried boi money.
//! - Lines whose reasons cancel out are dropped.
//!
//! Two bois owing each other are reported in both directions unless the
//! caller asks for [`net_pairwise`].

use std::collections::HashMap;

use sea_orm::FromQueryResult;

use crate::{Account, Boi, EngineError, MoneyCents, ResultEngine};

/// One row of the positions query.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct PositionRow {
    pub account: String,
    pub narration: String,
    pub amount_minor: i64,
}

/// One row of the debts query: what a boi's liability account holds per
/// creditor tag.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct DebtRow {
    pub creditor: String,
    pub narration: String,
    pub amount_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reason {
    /// Signed posting sum, as booked.
    pub amount: MoneyCents,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceLine {
    pub account: Account,
    pub net: MoneyCents,
    pub reasons: Vec<Reason>,
}

impl BalanceLine {
    pub fn is_liability(&self) -> bool {
        matches!(self.account, Account::Liability(_))
    }
}

/// What one boi owes to one creditor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Debt {
    pub creditor: Boi,
    pub owed: MoneyCents,
    pub reasons: Vec<Reason>,
}

/// Group `(key, amount, narration)` triples by key, first-seen order,
/// dropping zero amounts from the reasons.
fn group_reasons<K: PartialEq>(
    rows: impl IntoIterator<Item = (K, MoneyCents, String)>,
) -> Vec<(K, Vec<Reason>)> {
    let mut groups: Vec<(K, Vec<Reason>)> = Vec::new();
    for (key, amount, reason) in rows {
        let index = match groups.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                groups.push((key, Vec::new()));
                groups.len() - 1
            }
        };
        if !amount.is_zero() {
            groups[index].1.push(Reason { amount, reason });
        }
    }
    groups
}

fn liability_net(reasons: &[Reason]) -> MoneyCents {
    -reasons.iter().map(|r| r.amount).sum::<MoneyCents>()
}

/// Fold position rows into per-account balance lines.
pub fn aggregate(rows: &[PositionRow]) -> ResultEngine<Vec<BalanceLine>> {
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let account = Account::parse(&row.account)?;
        if account.is_clearing() {
            continue;
        }
        parsed.push((
            account,
            MoneyCents::new(row.amount_minor),
            row.narration.clone(),
        ));
    }

    let lines = group_reasons(parsed)
        .into_iter()
        .filter_map(|(account, reasons)| {
            let net = match &account {
                Account::Liability(_) => liability_net(&reasons),
                _ => reasons.iter().map(|r| r.amount).sum(),
            };
            (!net.is_zero()).then_some(BalanceLine {
                account,
                net,
                reasons,
            })
        })
        .collect();
    Ok(lines)
}

/// Fold the debt rows of `debtor` into one [`Debt`] per creditor.
///
/// Rows tagged with the debtor themself are the debtor's own expenses and
/// always cancel out; they are skipped.
pub fn aggregate_debts(debtor: &Boi, rows: &[DebtRow]) -> ResultEngine<Vec<Debt>> {
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let creditor = Boi::new(&row.creditor)
            .map_err(|_| EngineError::Ledger(format!("invalid tag: {}", row.creditor)))?;
        if &creditor == debtor {
            continue;
        }
        parsed.push((
            creditor,
            MoneyCents::new(row.amount_minor),
            row.narration.clone(),
        ));
    }

    Ok(group_reasons(parsed)
        .into_iter()
        .filter_map(|(creditor, reasons)| {
            let owed = liability_net(&reasons);
            (!owed.is_zero()).then_some(Debt {
                creditor,
                owed,
                reasons,
            })
        })
        .collect())
}

/// Net `boi`'s balance lines against what `boi` owes each other participant.
///
/// `reports` holds the (unnetted) balance lines of the other participants.
/// For every other boi `x`, the result carries a single liability line whose
/// net is "what `x` owes `boi`" minus "what `boi` owes `x`"; a negative net
/// means `boi` is the one who owes. The reasons of the reverse direction are
/// appended with their sign flipped so the net still equals the flipped sum
/// of reasons.
pub fn net_pairwise(
    boi: &Boi,
    mine: Vec<BalanceLine>,
    reports: &HashMap<Boi, Vec<BalanceLine>>,
) -> Vec<BalanceLine> {
    let mut lines = Vec::with_capacity(mine.len());
    let mut covered = Vec::new();
    for mut line in mine {
        if let Account::Liability(other) = &line.account
            && other != boi
        {
            if let Some(back) = owed_back(reports, boi, other) {
                line.net -= back.net;
                line.reasons.extend(flipped(back, other));
            }
            covered.push(other.clone());
        }
        lines.push(line);
    }

    let mut others: Vec<&Boi> = reports.keys().filter(|other| *other != boi).collect();
    others.sort();
    for other in others {
        if covered.contains(other) {
            continue;
        }
        if let Some(back) = owed_back(reports, boi, other) {
            lines.push(BalanceLine {
                account: Account::Liability(other.clone()),
                net: -back.net,
                reasons: flipped(back, other),
            });
        }
    }

    lines.retain(|line| !line.net.is_zero());
    lines
}

/// The line of `other`'s report saying what `boi` owes `other`.
fn owed_back<'a>(
    reports: &'a HashMap<Boi, Vec<BalanceLine>>,
    boi: &Boi,
    other: &Boi,
) -> Option<&'a BalanceLine> {
    reports
        .get(other)?
        .iter()
        .find(|line| matches!(&line.account, Account::Liability(debtor) if debtor == boi))
}

fn flipped(line: &BalanceLine, other: &Boi) -> Vec<Reason> {
    line.reasons
        .iter()
        .map(|r| Reason {
            amount: -r.amount,
            reason: format!("{} (owed to {other})", r.reason),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(account: &str, cents: i64, narration: &str) -> PositionRow {
        PositionRow {
            account: account.to_string(),
            narration: narration.to_string(),
            amount_minor: cents,
        }
    }

    fn boi(name: &str) -> Boi {
        Boi::new(name).unwrap()
    }

    #[test]
    fn liability_nets_are_sign_flipped() {
        let lines = aggregate(&[
            row("Liabilities:Bois:Beto", -50_00, "1/2 of food"),
            row("Liabilities:Bois:Beto", -10_00, "1/2 of taxi"),
        ])
        .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].account, Account::Liability(boi("Beto")));
        assert_eq!(lines[0].net, MoneyCents::new(60_00));
        assert_eq!(lines[0].reasons.len(), 2);
        assert_eq!(lines[0].reasons[0].reason, "1/2 of food");
        assert_eq!(lines[0].reasons[0].amount, MoneyCents::new(-50_00));
    }

    #[test]
    fn zero_net_liability_is_suppressed() {
        let lines = aggregate(&[
            row("Liabilities:Bois:Beto", 50_00, "A"),
            row("Liabilities:Bois:Beto", -50_00, "B"),
        ])
        .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn clearing_account_is_never_shown() {
        let lines = aggregate(&[
            row("Assets:CoroPago", -50_00, "1/2 of food"),
            row("Expenses:Food", 100_00, "food"),
        ])
        .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].account.path(), "Expenses:Food");
        assert_eq!(lines[0].net, MoneyCents::new(100_00));
        assert!(!lines[0].is_liability());
    }

    #[test]
    fn accounts_appear_once_in_first_seen_order() {
        let lines = aggregate(&[
            row("Liabilities:Bois:Caro", -5_00, "x"),
            row("Liabilities:Bois:Beto", -7_00, "y"),
            row("Liabilities:Bois:Caro", -1_00, "z"),
            row("Liabilities:Bois:Ana", 0, "w"),
        ])
        .unwrap();

        let accounts: Vec<&str> = lines.iter().map(|l| l.account.short_name()).collect();
        assert_eq!(accounts, vec!["Caro", "Beto"]);
        assert_eq!(lines[0].net, MoneyCents::new(6_00));
    }

    #[test]
    fn unknown_accounts_are_ledger_errors() {
        assert!(matches!(
            aggregate(&[row("Income:Salary", 1, "x")]),
            Err(EngineError::Ledger(_))
        ));
    }

    #[test]
    fn debts_group_by_creditor_and_skip_self() {
        let rows = vec![
            DebtRow {
                creditor: "Ana".to_string(),
                narration: "1/2 of food".to_string(),
                amount_minor: -50_00,
            },
            DebtRow {
                creditor: "Beto".to_string(),
                narration: "taxi".to_string(),
                amount_minor: -30_00,
            },
            DebtRow {
                creditor: "Caro".to_string(),
                narration: "1/3 of gas".to_string(),
                amount_minor: -10_00,
            },
            DebtRow {
                creditor: "Caro".to_string(),
                narration: "payment from Beto to Caro".to_string(),
                amount_minor: 10_00,
            },
        ];
        let debts = aggregate_debts(&boi("Beto"), &rows).unwrap();

        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].creditor, boi("Ana"));
        assert_eq!(debts[0].owed, MoneyCents::new(50_00));
    }

    fn liability(name: &str, net: i64) -> BalanceLine {
        BalanceLine {
            account: Account::Liability(boi(name)),
            net: MoneyCents::new(net),
            reasons: vec![Reason {
                amount: MoneyCents::new(-net),
                reason: format!("debt of {name}"),
            }],
        }
    }

    #[test]
    fn pairwise_netting_collapses_mutual_debts() {
        let mine = vec![liability("Beto", 50_00), liability("Caro", 20_00)];
        let reports = HashMap::from([
            (boi("Beto"), vec![liability("Ana", 30_00)]),
            (boi("Caro"), vec![liability("Ana", 20_00)]),
            (boi("Dani"), vec![liability("Ana", 5_00)]),
        ]);

        let lines = net_pairwise(&boi("Ana"), mine, &reports);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].account, Account::Liability(boi("Beto")));
        assert_eq!(lines[0].net, MoneyCents::new(20_00));
        assert_eq!(lines[0].reasons.len(), 2);
        assert_eq!(lines[0].net, liability_net(&lines[0].reasons));
        assert_eq!(lines[1].account, Account::Liability(boi("Dani")));
        assert_eq!(lines[1].net, MoneyCents::new(-5_00));
    }
}
