//! Human readable rendering of balance lines and debts.

use crossterm::style::Stylize;
use engine::{Account, BalanceLine, Boi, Debt, MoneyCents, Reason};

#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub color: bool,
}

impl Style {
    fn name(self, boi: &str) -> String {
        if self.color {
            boi.bold().to_string()
        } else {
            boi.to_string()
        }
    }

    fn amount(self, amount: MoneyCents) -> String {
        match (self.color, amount.is_negative()) {
            (false, _) => amount.to_string(),
            (true, true) => amount.to_string().red().to_string(),
            (true, false) => amount.to_string().green().to_string(),
        }
    }

    fn reason(self, reason: &str) -> String {
        if self.color {
            reason.dim().to_string()
        } else {
            reason.to_string()
        }
    }
}

/// Lines for the report of who owes `boi` and what `boi` spent.
///
/// Liability reasons are shown with the sign of the debt they add up to.
pub fn balances(boi: &Boi, lines: &[BalanceLine], style: Style) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        match &line.account {
            Account::Liability(other) => {
                let (debtor, creditor) = if line.net.is_negative() {
                    (boi, other)
                } else {
                    (other, boi)
                };
                out.push(format!(
                    "{} owes {} {}",
                    style.name(debtor.name()),
                    style.name(creditor.name()),
                    style.amount(line.net.abs())
                ));
                push_reasons(&mut out, &line.reasons, true, style);
            }
            Account::Expense(category) => {
                out.push(format!(
                    "Spent on {}: {}",
                    category.name(),
                    style.amount(line.net)
                ));
                push_reasons(&mut out, &line.reasons, false, style);
            }
            Account::Clearing => {}
        }
    }
    out
}

/// Lines for the report of whom `boi` owes.
pub fn debts(boi: &Boi, debts: &[Debt], style: Style) -> Vec<String> {
    let mut out = Vec::new();
    for debt in debts {
        let (debtor, creditor) = if debt.owed.is_negative() {
            (&debt.creditor, boi)
        } else {
            (boi, &debt.creditor)
        };
        out.push(format!(
            "{} owes {} {}",
            style.name(debtor.name()),
            style.name(creditor.name()),
            style.amount(debt.owed.abs())
        ));
        push_reasons(&mut out, &debt.reasons, true, style);
    }
    out
}

fn push_reasons(out: &mut Vec<String>, reasons: &[Reason], flip: bool, style: Style) {
    for reason in reasons {
        let amount = if flip { -reason.amount } else { reason.amount };
        out.push(format!(
            "    {}: {}",
            style.reason(&reason.reason),
            style.amount(amount)
        ));
    }
}

#[cfg(test)]
mod tests {
    use engine::Category;

    use super::*;

    const PLAIN: Style = Style { color: false };

    fn boi(name: &str) -> Boi {
        Boi::new(name).unwrap()
    }

    fn reason(cents: i64, reason: &str) -> Reason {
        Reason {
            amount: MoneyCents::new(cents),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn creditor_report() {
        let lines = vec![
            BalanceLine {
                account: Account::Expense(Category::from_label("food").unwrap()),
                net: MoneyCents::new(100_00),
                reasons: vec![reason(100_00, "food")],
            },
            BalanceLine {
                account: Account::Liability(boi("Beto")),
                net: MoneyCents::new(50_00),
                reasons: vec![reason(-50_00, "1/2 of food")],
            },
        ];
        assert_eq!(
            balances(&boi("Ana"), &lines, PLAIN),
            vec![
                "Spent on Food: 100.00 DOP",
                "    food: 100.00 DOP",
                "Beto owes Ana 50.00 DOP",
                "    1/2 of food: 50.00 DOP",
            ]
        );
    }

    #[test]
    fn negative_liability_reads_the_other_way() {
        let lines = vec![BalanceLine {
            account: Account::Liability(boi("Beto")),
            net: MoneyCents::new(-20_00),
            reasons: vec![reason(20_00, "payment from Beto to Ana")],
        }];
        assert_eq!(
            balances(&boi("Ana"), &lines, PLAIN),
            vec![
                "Ana owes Beto 20.00 DOP",
                "    payment from Beto to Ana: -20.00 DOP",
            ]
        );
    }

    #[test]
    fn debtor_report() {
        let owed = vec![Debt {
            creditor: boi("Ana"),
            owed: MoneyCents::new(50_00),
            reasons: vec![reason(-50_00, "1/2 of food")],
        }];
        assert_eq!(
            debts(&boi("Beto"), &owed, PLAIN),
            vec!["Beto owes Ana 50.00 DOP", "    1/2 of food: 50.00 DOP"]
        );
    }

    #[test]
    fn color_keeps_the_text() {
        let owed = vec![Debt {
            creditor: boi("Ana"),
            owed: MoneyCents::new(50_00),
            reasons: Vec::new(),
        }];
        let lines = debts(&boi("Beto"), &owed, Style { color: true });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Beto"));
        assert!(lines[0].contains("50.00 DOP"));
        assert_ne!(lines[0], "Beto owes Ana 50.00 DOP");
    }
}
