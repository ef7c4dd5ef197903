use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    JoinType, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};

use crate::{
    Account, BalanceLine, Boi, Debt, DebtRow, PositionRow, ResultEngine, aggregate,
    aggregate_debts, net_pairwise, postings, tags, transactions,
};

use super::Engine;

/// The one query shape the store answers: position sums per account and
/// narration over the transactions tagged with `tag`, optionally restricted
/// to a single day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionQuery {
    pub tag: Boi,
    pub date: Option<NaiveDate>,
}

impl PositionQuery {
    pub fn new(tag: Boi, date: Option<NaiveDate>) -> Self {
        Self { tag, date }
    }
}

fn amount_sum() -> SimpleExpr {
    Expr::col((postings::Entity, postings::Column::AmountMinor)).sum()
}

fn first_transaction() -> SimpleExpr {
    Expr::col((postings::Entity, postings::Column::TransactionId)).min()
}

fn first_position() -> SimpleExpr {
    Expr::col((postings::Entity, postings::Column::Position)).min()
}

impl Engine {
    /// `select account, narration, sum(position) where tag in tags [and date = D]
    /// group by account, narration`, rows in order of their first posting.
    pub async fn positions(&self, query: &PositionQuery) -> ResultEngine<Vec<PositionRow>> {
        let mut select = postings::Entity::find()
            .select_only()
            .column(postings::Column::Account)
            .column(transactions::Column::Narration)
            .column_as(amount_sum(), "amount_minor")
            .join(JoinType::InnerJoin, postings::Relation::Transactions.def())
            .join(JoinType::InnerJoin, transactions::Relation::Tags.def())
            .filter(tags::Column::Boi.eq(query.tag.name()));
        if let Some(date) = query.date {
            select = select.filter(transactions::Column::Date.eq(date));
        }

        let rows = select
            .group_by(postings::Column::Account)
            .group_by(transactions::Column::Narration)
            .order_by_asc(first_transaction())
            .order_by_asc(first_position())
            .into_model::<PositionRow>()
            .all(&self.database)
            .await?;
        tracing::debug!(tag = %query.tag, date = ?query.date, rows = rows.len(), "positions");
        Ok(rows)
    }

    /// Postings on `boi`'s liability account grouped by the creditor tag of
    /// their transaction and by narration.
    pub async fn debt_rows(&self, boi: &Boi, date: Option<NaiveDate>) -> ResultEngine<Vec<DebtRow>> {
        let mut select = postings::Entity::find()
            .select_only()
            .column_as(tags::Column::Boi, "creditor")
            .column(transactions::Column::Narration)
            .column_as(amount_sum(), "amount_minor")
            .join(JoinType::InnerJoin, postings::Relation::Transactions.def())
            .join(JoinType::InnerJoin, transactions::Relation::Tags.def())
            .filter(postings::Column::Account.eq(Account::Liability(boi.clone()).path()));
        if let Some(date) = date {
            select = select.filter(transactions::Column::Date.eq(date));
        }

        let rows = select
            .group_by(tags::Column::Boi)
            .group_by(transactions::Column::Narration)
            .order_by_asc(first_transaction())
            .order_by_asc(first_position())
            .into_model::<DebtRow>()
            .all(&self.database)
            .await?;
        tracing::debug!(debtor = %boi, date = ?date, rows = rows.len(), "debt rows");
        Ok(rows)
    }

    /// Who owes `boi`, and why.
    pub async fn balances(&self, boi: &Boi, date: Option<NaiveDate>) -> ResultEngine<Vec<BalanceLine>> {
        let rows = self
            .positions(&PositionQuery::new(boi.clone(), date))
            .await?;
        aggregate(&rows)
    }

    /// Whom `boi` owes, and why.
    pub async fn debts(&self, boi: &Boi, date: Option<NaiveDate>) -> ResultEngine<Vec<Debt>> {
        let rows = self.debt_rows(boi, date).await?;
        aggregate_debts(boi, &rows)
    }

    /// [`Engine::balances`] with mutual debts between `boi` and each of
    /// `others` collapsed into a single net line.
    pub async fn net_balances(
        &self,
        boi: &Boi,
        others: &[Boi],
        date: Option<NaiveDate>,
    ) -> ResultEngine<Vec<BalanceLine>> {
        let mine = self.balances(boi, date).await?;
        let mut reports = HashMap::with_capacity(others.len());
        for other in others.iter().filter(|other| *other != boi) {
            reports.insert(other.clone(), self.balances(other, date).await?);
        }
        Ok(net_pairwise(boi, mine, &reports))
    }
}
