// ABOUTME: Integration tests for database setup and manager-level invariants
// ABOUTME: Tests file-backed creation, migration idempotency, and reference checks

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutrio_server::database::dishes::{DishInput, DishManager};
use nutrio_server::database::menus::MenuManager;
use nutrio_server::database::Database;
use nutrio_server::models::MealSlot;

#[tokio::test]
async fn test_creates_database_file_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nutrio-test.db");
    let url = format!("sqlite:{}", path.display());

    let database = Database::new(&url).await.unwrap();
    assert!(path.exists());

    // Running migrations again is a no-op
    database.migrate().await.unwrap();
}

#[tokio::test]
async fn test_dish_delete_blocked_while_referenced() {
    let database = Database::new("sqlite::memory:").await.unwrap();
    let dishes = DishManager::new(database.pool().clone());
    let menus = MenuManager::new(database.pool().clone());

    let specialist = "spec-1";
    let dish = dishes
        .create(
            specialist,
            &DishInput {
                title: "Oats".into(),
                ..DishInput::default()
            },
        )
        .await
        .unwrap();

    let menu = menus.create(specialist, "Plan", 1, None).await.unwrap();
    menus
        .set_slot(&menu.id, specialist, 0, MealSlot::Breakfast, &dish.id)
        .await
        .unwrap();

    // Referenced by the menu: delete is a conflict
    let err = dishes.delete(&dish.id, specialist).await.unwrap_err();
    assert_eq!(err.http_status(), 409);

    // Clearing the slot unblocks the delete
    menus
        .clear_slot(&menu.id, specialist, 0, MealSlot::Breakfast)
        .await
        .unwrap();
    assert!(dishes.delete(&dish.id, specialist).await.unwrap());
}

#[tokio::test]
async fn test_slot_upsert_replaces_assignment() {
    let database = Database::new("sqlite::memory:").await.unwrap();
    let dishes = DishManager::new(database.pool().clone());
    let menus = MenuManager::new(database.pool().clone());

    let specialist = "spec-1";
    let oats = dishes
        .create(
            specialist,
            &DishInput {
                title: "Oats".into(),
                ..DishInput::default()
            },
        )
        .await
        .unwrap();
    let eggs = dishes
        .create(
            specialist,
            &DishInput {
                title: "Eggs".into(),
                ..DishInput::default()
            },
        )
        .await
        .unwrap();

    let menu = menus.create(specialist, "Plan", 1, None).await.unwrap();
    menus
        .set_slot(&menu.id, specialist, 0, MealSlot::Breakfast, &oats.id)
        .await
        .unwrap();
    menus
        .set_slot(&menu.id, specialist, 0, MealSlot::Breakfast, &eggs.id)
        .await
        .unwrap();

    let slots = menus.slots(&menu.id).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].dish_title, "Eggs");
}
