use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Account, Boi, Engine, EngineError, MoneyCents, PositionQuery, Registry, parse_ledger,
    render_ledger, synthesize,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Synthesize, render, parse back and load, the way the CLI does.
async fn engine_with_registry(json: &str) -> (Engine, Registry) {
    let registry = Registry::from_json(json).unwrap();
    let entries = synthesize(&registry).unwrap();
    let parsed = parse_ledger(&render_ledger(&entries)).unwrap();
    let (engine, _db) = engine_with_db().await;
    engine.load(&parsed).await.unwrap();
    (engine, registry)
}

fn boi(name: &str) -> Boi {
    Boi::new(name).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const ANA_PAYS_FOOD: &str = r#"{
    "bois": ["Ana", "Beto"],
    "expenses": [
        {"who": "Ana", "amount": 100, "expense": "food", "when": "2024-01-01",
         "split_between": ["Beto"]}
    ],
    "payments": []
}"#;

const ANA_PAYS_FOOD_BETO_SETTLES: &str = r#"{
    "bois": ["Ana", "Beto"],
    "expenses": [
        {"who": "Ana", "amount": 100, "expense": "food", "when": "2024-01-01",
         "split_between": ["Beto"]}
    ],
    "payments": [
        {"who": "Beto", "to": "Ana", "amount": 50, "when": "2024-01-02"}
    ]
}"#;

#[tokio::test]
async fn beto_owes_ana_half_of_the_food() {
    let (engine, _) = engine_with_registry(ANA_PAYS_FOOD).await;

    let lines = engine.balances(&boi("Ana"), None).await.unwrap();
    let liabilities: Vec<_> = lines.iter().filter(|l| l.is_liability()).collect();
    assert_eq!(liabilities.len(), 1);
    assert_eq!(liabilities[0].account, Account::Liability(boi("Beto")));
    assert_eq!(liabilities[0].net, MoneyCents::new(50_00));
    assert!(
        liabilities[0]
            .reasons
            .iter()
            .any(|r| r.reason.contains("food"))
    );

    let debts = engine.debts(&boi("Beto"), None).await.unwrap();
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0].creditor, boi("Ana"));
    assert_eq!(debts[0].owed, MoneyCents::new(50_00));
    assert_eq!(debts[0].reasons[0].reason, "1/2 of food");
}

#[tokio::test]
async fn payer_sees_what_was_spent_but_not_own_liability() {
    let (engine, _) = engine_with_registry(ANA_PAYS_FOOD).await;

    let lines = engine.balances(&boi("Ana"), None).await.unwrap();
    let accounts: Vec<String> = lines.iter().map(|l| l.account.path()).collect();
    assert_eq!(accounts, vec!["Expenses:Food", "Liabilities:Bois:Beto"]);
    assert_eq!(lines[0].net, MoneyCents::new(100_00));
}

#[tokio::test]
async fn settled_debt_is_suppressed() {
    let (engine, _) = engine_with_registry(ANA_PAYS_FOOD_BETO_SETTLES).await;

    let lines = engine.balances(&boi("Ana"), None).await.unwrap();
    assert!(lines.iter().all(|l| !l.is_liability()));

    let debts = engine.debts(&boi("Beto"), None).await.unwrap();
    assert!(debts.is_empty());
}

#[tokio::test]
async fn date_filter_restricts_to_one_day() {
    let (engine, _) = engine_with_registry(ANA_PAYS_FOOD_BETO_SETTLES).await;

    let day_two = engine
        .balances(&boi("Ana"), Some(date(2024, 1, 2)))
        .await
        .unwrap();
    assert_eq!(day_two.len(), 1);
    assert_eq!(day_two[0].account, Account::Liability(boi("Beto")));
    // Only the payment is visible: Beto is 50 ahead of Ana on that day.
    assert_eq!(day_two[0].net, MoneyCents::new(-50_00));

    let nothing = engine
        .balances(&boi("Ana"), Some(date(2023, 12, 31)))
        .await
        .unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn clearing_account_never_reaches_the_report() {
    let (engine, _) = engine_with_registry(ANA_PAYS_FOOD).await;

    let rows = engine
        .positions(&PositionQuery::new(boi("Ana"), None))
        .await
        .unwrap();
    assert!(rows.iter().any(|row| row.account == "Assets:CoroPago"));

    let lines = engine.balances(&boi("Ana"), None).await.unwrap();
    assert!(lines.iter().all(|l| !l.account.is_clearing()));
}

#[tokio::test]
async fn uneven_split_keeps_every_transaction_balanced() {
    let (engine, registry) = engine_with_registry(
        r#"{
            "bois": ["Ana", "Beto", "Caro"],
            "expenses": [
                {"who": "Ana", "amount": "100", "expense": "gas", "when": "2024-02-01",
                 "split_between": ["Beto", "Caro"]}
            ],
            "payments": []
        }"#,
    )
    .await;

    let entries = synthesize(&registry).unwrap();
    for tx in entries.iter().filter_map(|e| e.as_transaction()) {
        assert!(tx.is_balanced());
    }

    let rows = engine
        .positions(&PositionQuery::new(boi("Ana"), None))
        .await
        .unwrap();
    let clearing: i64 = rows
        .iter()
        .filter(|row| row.account == "Assets:CoroPago")
        .map(|row| row.amount_minor)
        .sum();
    assert_eq!(clearing, -33_34);

    let lines = engine.balances(&boi("Ana"), None).await.unwrap();
    let owed: Vec<(String, i64)> = lines
        .iter()
        .filter(|l| l.is_liability())
        .map(|l| (l.account.short_name().to_string(), l.net.cents()))
        .collect();
    assert_eq!(
        owed,
        vec![("Beto".to_string(), 33_33), ("Caro".to_string(), 33_33)]
    );
}

const MUTUAL: &str = r#"{
    "bois": ["Ana", "Beto"],
    "expenses": [
        {"who": "Ana", "amount": 100, "expense": "food", "when": "2024-01-01",
         "split_between": ["Beto"]},
        {"who": "Beto", "amount": 60, "expense": "taxi", "when": "2024-01-03",
         "split_between": ["Ana"]}
    ],
    "payments": []
}"#;

#[tokio::test]
async fn mutual_debts_are_reported_in_both_directions() {
    let (engine, _) = engine_with_registry(MUTUAL).await;

    let ana = engine.balances(&boi("Ana"), None).await.unwrap();
    let beto_owes = ana
        .iter()
        .find(|l| l.account == Account::Liability(boi("Beto")))
        .unwrap();
    assert_eq!(beto_owes.net, MoneyCents::new(50_00));

    let beto = engine.balances(&boi("Beto"), None).await.unwrap();
    let ana_owes = beto
        .iter()
        .find(|l| l.account == Account::Liability(boi("Ana")))
        .unwrap();
    assert_eq!(ana_owes.net, MoneyCents::new(30_00));
}

#[tokio::test]
async fn net_balances_collapse_mutual_debts() {
    let (engine, registry) = engine_with_registry(MUTUAL).await;

    let ana = engine
        .net_balances(&boi("Ana"), &registry.bois, None)
        .await
        .unwrap();
    let liabilities: Vec<_> = ana.iter().filter(|l| l.is_liability()).collect();
    assert_eq!(liabilities.len(), 1);
    assert_eq!(liabilities[0].net, MoneyCents::new(20_00));

    let beto = engine
        .net_balances(&boi("Beto"), &registry.bois, None)
        .await
        .unwrap();
    let liabilities: Vec<_> = beto.iter().filter(|l| l.is_liability()).collect();
    assert_eq!(liabilities.len(), 1);
    assert_eq!(liabilities[0].net, MoneyCents::new(-20_00));
}

#[tokio::test]
async fn reloading_replaces_previous_content() {
    let (engine, _) = engine_with_registry(ANA_PAYS_FOOD).await;

    let registry = Registry::from_json(ANA_PAYS_FOOD_BETO_SETTLES).unwrap();
    engine.load(&synthesize(&registry).unwrap()).await.unwrap();

    let lines = engine.balances(&boi("Ana"), None).await.unwrap();
    assert!(lines.iter().all(|l| !l.is_liability()));
}

#[test]
fn unknown_participant_fails_before_any_entry() {
    let err = Registry::from_json(
        r#"{
            "bois": ["Ana"],
            "expenses": [
                {"who": "Ana", "amount": 10, "expense": "food", "when": "2024-01-01",
                 "split_between": ["Beto"]}
            ],
            "payments": []
        }"#,
    )
    .unwrap_err();
    assert_eq!(err, EngineError::UnknownParticipant("Beto".to_string()));
}

#[test]
fn ledger_text_is_reproducible() {
    let registry = Registry::from_json(MUTUAL).unwrap();
    let first = render_ledger(&synthesize(&registry).unwrap());
    let second = render_ledger(&synthesize(&registry).unwrap());
    assert_eq!(first, second);
}
