use std::collections::HashSet;
use std::sync::Arc;
use studygoal_core::{
    DataStore, GoalPatch, MemoryKeyValueStore, NewGoal, RecordKind, StoreError, StoreState,
};

async fn ready_store() -> (DataStore, MemoryKeyValueStore) {
    let kv = MemoryKeyValueStore::new();
    let store = DataStore::new(Arc::new(kv.clone()));
    store.load().await.unwrap();
    (store, kv)
}

#[tokio::test]
async fn subject_goal_toggle_scenario() {
    let (store, _kv) = ready_store().await;

    store.add_subject("Math").await.unwrap();
    let goal = store
        .add_goal(NewGoal::new("Finish ch.3", "Math"))
        .await
        .unwrap();
    store.toggle_goal_completion(&goal.id).await.unwrap();

    let subjects = store.subjects();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].name, "Math");

    let goals = store.goals();
    assert_eq!(goals.len(), 1);
    assert!(goals[0].completed);
    assert_eq!(goals[0].title, "Finish ch.3");
    assert_eq!(goals[0].subject, "Math");
}

#[tokio::test]
async fn add_goal_with_unknown_subject_creates_nothing() {
    let (store, kv) = ready_store().await;

    let err = store
        .add_goal(NewGoal::new("X", "Unknown"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.goals().is_empty());
    assert_eq!(kv.write_count(), 0);
}

#[tokio::test]
async fn duplicate_subject_leaves_collection_unchanged() {
    let (store, _kv) = ready_store().await;
    for name in ["Math", "Physics", "Chemistry"] {
        store.add_subject(name).await.unwrap();
    }
    let before = store.subjects();

    let err = store.add_subject("  Physics ").await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(ref name) if name == "Physics"));
    assert_eq!(store.subjects(), before);

    let names: HashSet<String> = store.subjects().into_iter().map(|s| s.name).collect();
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn blank_inputs_are_validation_errors() {
    let (store, _kv) = ready_store().await;
    assert!(matches!(
        store.add_subject("   ").await.unwrap_err(),
        StoreError::Validation(_)
    ));

    store.add_subject("Math").await.unwrap();
    assert!(matches!(
        store.add_goal(NewGoal::new("  ", "Math")).await.unwrap_err(),
        StoreError::Validation(_)
    ));
}

#[tokio::test]
async fn toggle_twice_restores_original_goal() {
    let (store, _kv) = ready_store().await;
    store.add_subject("Math").await.unwrap();
    let created = store
        .add_goal(NewGoal::new("Drill", "Math").description("20 problems"))
        .await
        .unwrap();

    let once = store.toggle_goal_completion(&created.id).await.unwrap();
    assert!(once.completed);
    let mut reverted = once.clone();
    reverted.completed = false;
    assert_eq!(reverted, created);

    let twice = store.toggle_goal_completion(&created.id).await.unwrap();
    assert_eq!(twice, created);
}

#[tokio::test]
async fn deleting_subject_keeps_goals_referencing_it() {
    let (store, _kv) = ready_store().await;
    let math = store.add_subject("Math").await.unwrap();
    let goal = store
        .add_goal(NewGoal::new("Finish ch.3", "Math"))
        .await
        .unwrap();

    store.delete_subject(&math.id).await.unwrap();

    assert!(store.subjects().is_empty());
    assert_eq!(store.goals(), vec![goal.clone()]);
    assert_eq!(store.resolve_subject(&goal), None);
    assert_eq!(store.orphaned_goals(), vec![goal.clone()]);
    assert_eq!(store.goals_for_subject("Math"), vec![goal]);
}

#[tokio::test]
async fn update_goal_merges_fields_and_validates_subject() {
    let (store, _kv) = ready_store().await;
    store.add_subject("Math").await.unwrap();
    store.add_subject("Physics").await.unwrap();
    let created = store.add_goal(NewGoal::new("Read", "Math")).await.unwrap();
    store.toggle_goal_completion(&created.id).await.unwrap();

    let err = store
        .update_goal(
            &created.id,
            GoalPatch {
                subject: Some("Biology".to_string()),
                ..GoalPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let updated = store
        .update_goal(
            &created.id,
            GoalPatch {
                title: Some(" Read ch.4 ".to_string()),
                subject: Some("Physics".to_string()),
                description: Some("before friday".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Read ch.4");
    assert_eq!(updated.subject, "Physics");
    assert_eq!(updated.description, "before friday");
    assert!(updated.completed);
    assert_eq!(updated.date, created.date);
    assert_eq!(
        store.resolve_subject(&updated).map(|s| s.name),
        Some("Physics".to_string())
    );
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let (store, _kv) = ready_store().await;

    let err = store.delete_subject("missing").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { kind: RecordKind::Subject, ref id } if id == "missing"
    ));
    for err in [
        store.toggle_goal_completion("missing").await.unwrap_err(),
        store.delete_goal("missing").await.unwrap_err(),
        store
            .update_goal("missing", GoalPatch::default())
            .await
            .unwrap_err(),
    ] {
        assert!(matches!(err, StoreError::NotFound { kind: RecordKind::Goal, .. }));
    }
}

#[tokio::test]
async fn delete_goal_removes_only_that_goal() {
    let (store, _kv) = ready_store().await;
    store.add_subject("Math").await.unwrap();
    let first = store.add_goal(NewGoal::new("One", "Math")).await.unwrap();
    let second = store.add_goal(NewGoal::new("Two", "Math")).await.unwrap();

    store.delete_goal(&first.id).await.unwrap();
    assert_eq!(store.goals(), vec![second]);
}

#[tokio::test]
async fn subscribers_observe_ready_state_and_mutations() {
    let kv = MemoryKeyValueStore::new();
    let store = DataStore::new(Arc::new(kv));
    let mut rx = store.subscribe();
    assert_eq!(rx.borrow().state, StoreState::Uninitialized);

    store.load().await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_ready());

    store.add_subject("Math").await.unwrap();
    rx.changed().await.unwrap();
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.subjects.len(), 1);
    assert!(snapshot.goals.is_empty());
}

#[tokio::test]
async fn store_stays_usable_after_failed_operations() {
    let (store, _kv) = ready_store().await;
    assert!(store.add_subject("").await.is_err());
    assert!(store.delete_goal("nope").await.is_err());

    store.add_subject("Math").await.unwrap();
    assert_eq!(store.subjects().len(), 1);
}
