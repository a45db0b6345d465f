use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CategoryKind, CreateTransactionCmd, Engine, EngineError};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
}

#[tokio::test]
async fn budget_starts_with_full_allocation_remaining() {
    let (engine, _db) = engine_with_db().await;
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();

    let budget_id = engine.new_budget("alice", groceries, 10_000).await.unwrap();

    let budget = engine.budget("alice", budget_id).await.unwrap();
    assert_eq!(budget.allocated.cents(), 10_000);
    assert_eq!(budget.remaining.cents(), 10_000);
    assert_eq!(budget.category_id, groceries);
}

#[tokio::test]
async fn budget_requires_an_expense_category() {
    let (engine, _db) = engine_with_db().await;
    let salary = engine
        .new_category("Salary", CategoryKind::Income)
        .await
        .unwrap();

    let err = engine.new_budget("alice", salary, 10_000).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidCategory("budgets only cover expense categories".to_string())
    );
}

#[tokio::test]
async fn one_budget_per_user_and_category() {
    let (engine, _db) = engine_with_db().await;
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();

    engine.new_budget("alice", groceries, 10_000).await.unwrap();
    let err = engine.new_budget("alice", groceries, 5_000).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Groceries".to_string()));
}

#[tokio::test]
async fn negative_allocation_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();

    let err = engine.new_budget("alice", groceries, -1).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("allocated amount must be >= 0".to_string())
    );
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .new_budget("alice", Uuid::new_v4(), 1_000)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );
}

#[tokio::test]
async fn two_expenses_accumulate_against_the_budget() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 20_000)
        .await
        .unwrap();
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();
    let budget_id = engine.new_budget("alice", groceries, 10_000).await.unwrap();

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 3_000, day(1),
        ))
        .await
        .unwrap();
    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 4_500, day(2),
        ))
        .await
        .unwrap();

    let budget = engine.budget("alice", budget_id).await.unwrap();
    assert_eq!(budget.remaining.cents(), 2_500);
    let account = engine.account("alice", account_id).await.unwrap();
    assert_eq!(account.balance.cents(), 12_500);
}

#[tokio::test]
async fn budget_remaining_can_go_negative() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("alice", "Cash", 0).await.unwrap();
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();
    let budget_id = engine.new_budget("alice", groceries, 1_000).await.unwrap();

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 1_500, day(3),
        ))
        .await
        .unwrap();

    let budget = engine.budget("alice", budget_id).await.unwrap();
    assert_eq!(budget.remaining.cents(), -500);
}

#[tokio::test]
async fn delete_budget_clears_explicit_references() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("alice", "Cash", 5_000).await.unwrap();
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();
    let budget_id = engine.new_budget("alice", groceries, 10_000).await.unwrap();

    let tx_id = engine
        .create_transaction(
            CreateTransactionCmd::new("alice", account_id, groceries, 1_000, day(4))
                .budget_id(budget_id),
        )
        .await
        .unwrap();

    engine.delete_budget("alice", budget_id).await.unwrap();

    // The transaction survives without its explicit reference, and the
    // account balance is untouched by the budget delete.
    let tx = engine.transaction("alice", tx_id).await.unwrap();
    assert_eq!(tx.budget_id, None);
    let account = engine.account("alice", account_id).await.unwrap();
    assert_eq!(account.balance.cents(), 4_000);
    let err = engine.budget("alice", budget_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("budget not exists".to_string())
    );

    // Deleting the transaction afterwards must not resurrect budget effects.
    engine.delete_transaction("alice", tx_id).await.unwrap();
    let account = engine.account("alice", account_id).await.unwrap();
    assert_eq!(account.balance.cents(), 5_000);
}

#[tokio::test]
async fn category_delete_is_blocked_while_in_use() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("alice", "Cash", 0).await.unwrap();
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 100, day(5),
        ))
        .await
        .unwrap();

    let err = engine.delete_category(groceries).await.unwrap_err();
    assert_eq!(err, EngineError::CategoryInUse("Groceries".to_string()));

    engine.delete_transaction("alice", tx_id).await.unwrap();
    engine.delete_category(groceries).await.unwrap();
    let err = engine.category(groceries).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );
}

#[tokio::test]
async fn category_delete_takes_its_budgets_with_it() {
    let (engine, _db) = engine_with_db().await;
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense)
        .await
        .unwrap();
    let budget_id = engine.new_budget("alice", groceries, 10_000).await.unwrap();

    engine.delete_category(groceries).await.unwrap();

    let err = engine.budget("alice", budget_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("budget not exists".to_string())
    );
}
