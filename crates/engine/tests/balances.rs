use sea_orm::{Database, DatabaseConnection};

use engine::{
    ActivityDirection, Engine, MoneyCents, Netting, NewExpenseCmd, RegisterCmd, SplitStrategy,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    for user in ["ana", "ben", "carla"] {
        engine
            .register_user(RegisterCmd {
                username: user.to_string(),
                password: "password".to_string(),
                name: format!("{user} tester"),
                email: format!("{user}@example.com"),
            })
            .await
            .unwrap();
    }
    (engine, db)
}

async fn trio_group(engine: &Engine, name: &str) -> String {
    let group_id = engine.new_group(name, "ana").await.unwrap();
    engine.add_group_member(&group_id, "ben", "ana").await.unwrap();
    engine
        .add_group_member(&group_id, "carla", "ana")
        .await
        .unwrap();
    group_id
}

/// Full-cover expense: `payer` paid, `debtor` owes the whole amount.
async fn cover(engine: &Engine, group_id: &str, payer: &str, debtor: &str, amount: i64) -> String {
    let detail = engine
        .create_expense(NewExpenseCmd {
            group_id: group_id.to_string(),
            amount: MoneyCents::new(amount),
            description: format!("{payer} covers {debtor}"),
            category: None,
            paid_by: payer.to_string(),
            participants: vec![payer.to_string(), debtor.to_string()],
            strategy: SplitStrategy::FullCover,
            user_id: payer.to_string(),
        })
        .await
        .unwrap();
    detail.expense.id.to_string()
}

#[tokio::test]
async fn balance_follows_the_sign_convention() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    // Others owe ana 3000; ana owes 1000.
    cover(&engine, &group_id, "ana", "ben", 3000).await;
    cover(&engine, &group_id, "ben", "ana", 1000).await;

    let view = engine.user_balance("ana", Netting::Gross).await.unwrap();
    assert_eq!(view.owed_to_user, MoneyCents::new(3000));
    assert_eq!(view.user_owes, MoneyCents::new(1000));
    assert_eq!(view.balance(), MoneyCents::new(2000));

    let view = engine.user_balance("ben", Netting::Gross).await.unwrap();
    assert_eq!(view.balance(), MoneyCents::new(-2000));
}

#[tokio::test]
async fn own_share_never_counts_on_either_side() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    // Equal split of 900 among three: ana's own 300 cancels out.
    engine
        .create_expense(NewExpenseCmd {
            group_id: group_id.clone(),
            amount: MoneyCents::new(900),
            description: "Dinner".to_string(),
            category: None,
            paid_by: "ana".to_string(),
            participants: vec!["ana".to_string(), "ben".to_string(), "carla".to_string()],
            strategy: SplitStrategy::Equal,
            user_id: "ana".to_string(),
        })
        .await
        .unwrap();

    let view = engine.user_balance("ana", Netting::Gross).await.unwrap();
    assert_eq!(view.owed_to_user, MoneyCents::new(600));
    assert_eq!(view.user_owes, MoneyCents::ZERO);
}

#[tokio::test]
async fn net_balance_drops_paid_shares() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    let expense_id = cover(&engine, &group_id, "ana", "ben", 3000).await;
    cover(&engine, &group_id, "ana", "carla", 500).await;

    engine
        .set_payment(&expense_id, "ben", true, "ben")
        .await
        .unwrap();

    let gross = engine.user_balance("ana", Netting::Gross).await.unwrap();
    assert_eq!(gross.owed_to_user, MoneyCents::new(3500));

    let net = engine.user_balance("ana", Netting::Net).await.unwrap();
    assert_eq!(net.owed_to_user, MoneyCents::new(500));

    // Unmarking brings it back.
    engine
        .set_payment(&expense_id, "ben", false, "ben")
        .await
        .unwrap();
    let net = engine.user_balance("ana", Netting::Net).await.unwrap();
    assert_eq!(net.owed_to_user, MoneyCents::new(3500));
}

#[tokio::test]
async fn pairwise_sums_are_not_netted() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    cover(&engine, &group_id, "ana", "ben", 3000).await;
    cover(&engine, &group_id, "ben", "ana", 1000).await;

    let pair = engine
        .pair_balance("ana", "ben", Netting::Gross)
        .await
        .unwrap();
    assert_eq!(pair.other_owes_user, MoneyCents::new(3000));
    assert_eq!(pair.user_owes_other, MoneyCents::new(1000));
}

#[tokio::test]
async fn group_balance_is_scoped_to_the_group() {
    let (engine, _db) = engine_with_db().await;
    let trip = trio_group(&engine, "Trip").await;
    let flat = trio_group(&engine, "Flat").await;

    cover(&engine, &trip, "ana", "ben", 3000).await;
    cover(&engine, &flat, "ana", "carla", 700).await;

    let view = engine
        .group_balance(&trip, "ana", Netting::Gross)
        .await
        .unwrap();
    assert_eq!(view.owed_to_user, MoneyCents::new(3000));

    let view = engine
        .group_balance(&flat, "ana", Netting::Gross)
        .await
        .unwrap();
    assert_eq!(view.owed_to_user, MoneyCents::new(700));
}

#[tokio::test]
async fn breakdown_orders_by_amount_then_names() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    cover(&engine, &group_id, "ana", "ben", 2000).await;
    cover(&engine, &group_id, "ana", "carla", 500).await;
    cover(&engine, &group_id, "ben", "carla", 500).await;

    // An equal split adds ana's own share, which must not appear as a pair.
    engine
        .create_expense(NewExpenseCmd {
            group_id: group_id.clone(),
            amount: MoneyCents::new(300),
            description: "Snacks".to_string(),
            category: None,
            paid_by: "ana".to_string(),
            participants: vec!["ana".to_string(), "ben".to_string(), "carla".to_string()],
            strategy: SplitStrategy::Equal,
            user_id: "ana".to_string(),
        })
        .await
        .unwrap();

    let rows = engine.debt_breakdown(&group_id, "ana").await.unwrap();
    let pairs: Vec<(&str, &str, i64)> = rows
        .iter()
        .map(|r| (r.debtor.as_str(), r.creditor.as_str(), r.total.cents()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("ben", "ana", 2100),
            ("carla", "ana", 600),
            ("carla", "ben", 500),
        ]
    );
    assert!(rows.iter().all(|r| r.debtor != r.creditor));
    assert_eq!(rows[0].debtor_name, "ben tester");
}

#[tokio::test]
async fn group_summary_tracks_spent_settled_outstanding() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    let expense_id = cover(&engine, &group_id, "ana", "ben", 3000).await;
    cover(&engine, &group_id, "ana", "carla", 1000).await;
    engine
        .set_payment(&expense_id, "ben", true, "ben")
        .await
        .unwrap();

    let summary = engine.group_summary(&group_id, "ana").await.unwrap();
    assert_eq!(summary.total_spent, MoneyCents::new(4000));
    assert_eq!(summary.total_settled, MoneyCents::new(3000));
    assert_eq!(summary.total_outstanding, MoneyCents::new(1000));

    let ana = summary
        .members
        .iter()
        .find(|m| m.username == "ana")
        .unwrap();
    assert_eq!(ana.owed_to, MoneyCents::new(4000));
    assert_eq!(ana.owes, MoneyCents::ZERO);
    let ben = summary
        .members
        .iter()
        .find(|m| m.username == "ben")
        .unwrap();
    assert_eq!(ben.owes, MoneyCents::new(3000));
}

#[tokio::test]
async fn owed_creditors_lists_only_unpaid_debts() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    let paid_expense = cover(&engine, &group_id, "ana", "carla", 2000).await;
    cover(&engine, &group_id, "ben", "carla", 700).await;
    engine
        .set_payment(&paid_expense, "carla", true, "carla")
        .await
        .unwrap();

    let creditors = engine.owed_creditors("carla").await.unwrap();
    assert_eq!(creditors.len(), 1);
    assert_eq!(creditors[0].creditor, "ben");
    assert_eq!(creditors[0].total, MoneyCents::new(700));
}

#[tokio::test]
async fn activity_reports_direction_and_own_stake() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;

    engine
        .create_expense(NewExpenseCmd {
            group_id: group_id.clone(),
            amount: MoneyCents::new(900),
            description: "Dinner".to_string(),
            category: None,
            paid_by: "ana".to_string(),
            participants: vec!["ana".to_string(), "ben".to_string(), "carla".to_string()],
            strategy: SplitStrategy::Equal,
            user_id: "ana".to_string(),
        })
        .await
        .unwrap();

    let feed = engine.activity("ana").await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].direction, ActivityDirection::Recovers);
    // She recovers the total minus her own 300 share.
    assert_eq!(feed[0].amount, MoneyCents::new(600));
    assert_eq!(feed[0].group_name, "Trip");

    let feed = engine.activity("ben").await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].direction, ActivityDirection::Owes);
    assert_eq!(feed[0].amount, MoneyCents::new(300));
}

#[tokio::test]
async fn profile_carries_the_gross_balance() {
    let (engine, _db) = engine_with_db().await;
    let group_id = trio_group(&engine, "Trip").await;
    cover(&engine, &group_id, "ana", "ben", 1500).await;

    let profile = engine.user_profile("ana").await.unwrap();
    assert_eq!(profile.name, "ana tester");
    assert_eq!(profile.balance.balance(), MoneyCents::new(1500));
}
