use sea_orm::Database;

use engine::{Engine, EngineError, MoneyCents, NewExpenseCmd, RegisterCmd, SplitStrategy};
use migration::MigratorTrait;

async fn engine_with_users() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build();
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
    engine
}

fn register(username: &str, name: &str, email: &str) -> RegisterCmd {
    RegisterCmd {
        username: username.to_string(),
        password: "password".to_string(),
        name: name.to_string(),
        email: email.to_string(),
    }
}

#[tokio::test]
async fn registration_validates_name_and_email() {
    let engine = engine_with_users().await;

    let err = engine
        .register_user(register("dora", "Do", "dora@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .register_user(register("dora", "Dora", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn registration_rejects_duplicate_username_and_email() {
    let engine = engine_with_users().await;

    let err = engine
        .register_user(register("ana", "Ana Again", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .register_user(register("dora", "Dora", "ana@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn friends_cannot_be_yourself_or_added_twice() {
    let engine = engine_with_users().await;

    let err = engine.add_friend("ana", "ana").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine.add_friend("ana", "ben").await.unwrap();
    let err = engine.add_friend("ana", "ben").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine.add_friend("ana", "nobody").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn removing_a_friend_clears_both_directions() {
    let engine = engine_with_users().await;

    engine.add_friend("ana", "ben").await.unwrap();
    engine.add_friend("ben", "ana").await.unwrap();

    engine.remove_friend("ana", "ben").await.unwrap();
    assert!(engine.list_friends("ana").await.unwrap().is_empty());
    assert!(engine.list_friends("ben").await.unwrap().is_empty());

    let err = engine.remove_friend("ana", "ben").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn friend_detail_shows_shared_groups_and_mutual_sums() {
    let engine = engine_with_users().await;
    engine.add_friend("ana", "ben").await.unwrap();

    let trip = engine.new_group("Trip", "ana").await.unwrap();
    engine.add_group_member(&trip, "ben", "ana").await.unwrap();
    let solo = engine.new_group("Solo", "ana").await.unwrap();
    let _ = solo;

    engine
        .create_expense(NewExpenseCmd {
            group_id: trip.clone(),
            amount: MoneyCents::new(2000),
            description: "Tickets".to_string(),
            category: None,
            paid_by: "ana".to_string(),
            participants: vec!["ana".to_string(), "ben".to_string()],
            strategy: SplitStrategy::FullCover,
            user_id: "ana".to_string(),
        })
        .await
        .unwrap();

    let detail = engine.friend_detail("ana", "ben").await.unwrap();
    assert_eq!(detail.username, "ben");
    assert_eq!(detail.shared_groups.len(), 1);
    assert_eq!(detail.shared_groups[0].name, "Trip");
    assert_eq!(detail.owes_me, MoneyCents::new(2000));
    assert_eq!(detail.i_owe, MoneyCents::ZERO);

    // Not a friend yet, so no detail view.
    let err = engine.friend_detail("ben", "carla").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn friend_list_orders_by_username_with_sums() {
    let engine = engine_with_users().await;
    engine.add_friend("ana", "carla").await.unwrap();
    engine.add_friend("ana", "ben").await.unwrap();

    let friends = engine.list_friends("ana").await.unwrap();
    let names: Vec<&str> = friends.iter().map(|f| f.username.as_str()).collect();
    assert_eq!(names, vec!["ben", "carla"]);
    assert_eq!(friends[0].name, "ben tester");
}

#[tokio::test]
async fn group_membership_rules_hold() {
    let engine = engine_with_users().await;
    let group_id = engine.new_group("Trip", "ana").await.unwrap();
    engine.add_group_member(&group_id, "ben", "ana").await.unwrap();

    // Creator cannot be removed, not even by themselves.
    let err = engine
        .remove_group_member(&group_id, "ana", "ana")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Members cannot remove each other.
    engine
        .add_group_member(&group_id, "carla", "ben")
        .await
        .unwrap();
    let err = engine
        .remove_group_member(&group_id, "carla", "ben")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Leaving on your own is fine.
    engine
        .remove_group_member(&group_id, "ben", "ben")
        .await
        .unwrap();
    let members = engine.list_group_members(&group_id, "ana").await.unwrap();
    let names: Vec<&str> = members.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(names, vec!["ana", "carla"]);
}
