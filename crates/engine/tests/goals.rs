use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError};
use migration::MigratorTrait;

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

async fn seed_user(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec![username.into(), "password".into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn new_goal_starts_at_zero() {
    let (engine, _db) = engine_with_db().await;
    let goal_id = engine
        .new_goal("alice", "Vacation", Some("Two weeks in Sardinia"), 150_000)
        .await
        .unwrap();

    let goal = engine.goal("alice", goal_id).await.unwrap();
    assert_eq!(goal.current.cents(), 0);
    assert_eq!(goal.target.cents(), 150_000);
    assert_eq!(goal.description, "Two weeks in Sardinia");
}

#[tokio::test]
async fn funding_accumulates() {
    let (engine, _db) = engine_with_db().await;
    let goal_id = engine
        .new_goal("alice", "Vacation", None, 150_000)
        .await
        .unwrap();

    let funded = engine.fund_goal("alice", goal_id, "10.50").await.unwrap();
    assert_eq!(funded.current.cents(), 1_050);
    let funded = engine.fund_goal("alice", goal_id, "4,50").await.unwrap();
    assert_eq!(funded.current.cents(), 1_500);

    let goal = engine.goal("alice", goal_id).await.unwrap();
    assert_eq!(goal.current.cents(), 1_500);
}

#[tokio::test]
async fn funding_rejects_bad_amounts() {
    let (engine, _db) = engine_with_db().await;
    let goal_id = engine
        .new_goal("alice", "Vacation", None, 150_000)
        .await
        .unwrap();

    for amount in ["abc", "1.2.3", ""] {
        assert!(matches!(
            engine.fund_goal("alice", goal_id, amount).await,
            Err(EngineError::InvalidAmount(_))
        ));
    }
    for amount in ["0", "-5"] {
        let err = engine.fund_goal("alice", goal_id, amount).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount must be > 0".to_string())
        );
    }

    let goal = engine.goal("alice", goal_id).await.unwrap();
    assert_eq!(goal.current.cents(), 0);
}

#[tokio::test]
async fn target_must_be_positive() {
    let (engine, _db) = engine_with_db().await;
    for target in [0, -100] {
        let err = engine
            .new_goal("alice", "Vacation", None, target)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("target must be > 0".to_string())
        );
    }
}

#[tokio::test]
async fn goals_are_private_to_their_owner() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "bob").await;

    let goal_id = engine
        .new_goal("alice", "Vacation", None, 150_000)
        .await
        .unwrap();

    let err = engine.fund_goal("bob", goal_id, "10").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::OwnershipViolation("savings_goal".to_string())
    );
    let err = engine.goal("bob", goal_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::OwnershipViolation("savings_goal".to_string())
    );
}

#[tokio::test]
async fn goal_names_are_unique_per_user() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "bob").await;

    engine
        .new_goal("alice", "Vacation", None, 150_000)
        .await
        .unwrap();
    let err = engine
        .new_goal("alice", "vacation", None, 50_000)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("vacation".to_string()));

    // A different user may reuse the name.
    engine.new_goal("bob", "Vacation", None, 1_000).await.unwrap();
}

#[tokio::test]
async fn delete_goal_removes_it() {
    let (engine, _db) = engine_with_db().await;
    let goal_id = engine
        .new_goal("alice", "Vacation", None, 150_000)
        .await
        .unwrap();

    engine.delete_goal("alice", goal_id).await.unwrap();

    let err = engine.goal("alice", goal_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("savings_goal not exists".to_string())
    );
}

#[tokio::test]
async fn goal_listing_is_sorted_by_name() {
    let (engine, _db) = engine_with_db().await;
    engine.new_goal("alice", "Car", None, 500_000).await.unwrap();
    engine
        .new_goal("alice", "Bike", None, 80_000)
        .await
        .unwrap();

    let goals = engine.list_goals("alice").await.unwrap();
    let names: Vec<&str> = goals.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Bike", "Car"]);
}
