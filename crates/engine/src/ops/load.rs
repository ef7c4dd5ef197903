use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    Currency, EngineError, Entry, ResultEngine, accounts, postings, tags,
    transactions::{self, ordinal_id},
};

use super::{Engine, with_tx};

impl Engine {
    /// Replaces the store content with `entries`.
    ///
    /// Runs in a single DB transaction: either every entry is stored or the
    /// previous content is left untouched.
    pub async fn load(&self, entries: &[Entry]) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            async {
                tags::Entity::delete_many().exec(&db_tx).await?;
                postings::Entity::delete_many().exec(&db_tx).await?;
                transactions::Entity::delete_many().exec(&db_tx).await?;
                accounts::Entity::delete_many().exec(&db_tx).await?;

                let mut postings_count = 0usize;
                for entry in entries {
                    match entry {
                        Entry::Open(open) => {
                            let model = accounts::ActiveModel {
                                account: ActiveValue::Set(open.account.path()),
                                opened_on: ActiveValue::Set(open.date),
                                currency: ActiveValue::Set(open.currency.code().to_string()),
                            };
                            accounts::Entity::insert(model)
                                .exec_without_returning(&db_tx)
                                .await?;
                        }
                        Entry::Transaction(tx) => {
                            tx.ensure_balanced()?;
                            let id = ordinal_id(tx.ordinal)?;
                            transactions::Entity::insert(transactions::ActiveModel::try_from(tx)?)
                                .exec_without_returning(&db_tx)
                                .await?;
                            for tag in &tx.tags {
                                let model = tags::ActiveModel {
                                    transaction_id: ActiveValue::Set(id),
                                    boi: ActiveValue::Set(tag.name().to_string()),
                                };
                                tags::Entity::insert(model)
                                    .exec_without_returning(&db_tx)
                                    .await?;
                            }
                            for (position, posting) in (0i32..).zip(&tx.postings) {
                                postings::Entity::insert(postings::ActiveModel::from_posting(
                                    id, position, posting,
                                ))
                                .exec_without_returning(&db_tx)
                                .await?;
                                postings_count += 1;
                            }
                        }
                    }
                }

                tracing::debug!(
                    entries = entries.len(),
                    postings = postings_count,
                    currency = %Currency::Dop,
                    "ledger loaded"
                );
                Ok::<(), EngineError>(())
            }
            .await
        })
    }
}
