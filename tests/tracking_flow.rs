mod common;

use sea_orm::{ EntityTrait, PaginatorTrait };

use price_tracker::db::entity::Shop;
use price_tracker::enums::{ Condition, ConditionKind };
use price_tracker::error::{ AppError, ErrorKind };

use common::{ listing, product_url, TestEngine, ITEM_ID, OTHER_ITEM_ID, SHOP_ID };

#[tokio::test]
async fn test_first_track_creates_record_member_and_default_condition() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;

    let tracking_id = engine.track_default(alice.id, 100).await;

    let record = engine.trackings.find_by_id(tracking_id).await.unwrap().unwrap();
    let product = engine.product(ITEM_ID).await;
    assert_eq!(record.external_id, ITEM_ID);
    assert_eq!(record.product_id, Some(product.id));
    assert!(record.status);
    assert_eq!(record.source_url, product_url(SHOP_ID, ITEM_ID));

    assert_eq!(engine.trackings.member_ids(tracking_id).await.unwrap(), vec![alice.id]);

    let conditions = engine.conditions.list_for_member(tracking_id, alice.id).await.unwrap();
    assert_eq!(conditions.len(), 1);
    assert!(conditions[0].active);
    assert_eq!(conditions[0].condition().unwrap(), Condition::LessThan);
}

#[tokio::test]
async fn test_first_track_imports_the_whole_shop() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;

    engine.track_default(alice.id, 100).await;

    assert_eq!(engine.crawler.calls(), vec![SHOP_ID]);
    let sibling = engine.product(OTHER_ITEM_ID).await;
    assert_eq!(sibling.price, 500);
    assert_eq!(
        sibling.images,
        serde_json::json!([format!("https://down-vn.img.susercontent.com/file/img-{}", OTHER_ITEM_ID)])
    );
}

#[tokio::test]
async fn test_track_twice_is_rejected_without_new_rows() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;

    let err = engine.tracking_service
        .track(alice.id, &product_url(SHOP_ID, ITEM_ID)).await
        .unwrap_err();

    assert!(matches!(err, AppError::AlreadyTracking));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(engine.trackings.member_ids(tracking_id).await.unwrap().len(), 1);
    assert_eq!(engine.conditions.list_for_member(tracking_id, alice.id).await.unwrap().len(), 1);
    // product was already stored, so no second crawl
    assert_eq!(engine.crawler.calls().len(), 1);
}

#[tokio::test]
async fn test_second_user_joins_existing_record() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let bob = engine.user("bob@example.com").await;

    let first = engine.track_default(alice.id, 100).await;
    let second = engine.tracking_service
        .track(bob.id, &product_url(SHOP_ID, ITEM_ID)).await
        .unwrap();

    assert_eq!(first, second.id);
    let mut members = engine.trackings.member_ids(first).await.unwrap();
    members.sort();
    let mut expected = vec![alice.id, bob.id];
    expected.sort();
    assert_eq!(members, expected);
    assert_eq!(engine.conditions.list_for_member(first, bob.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_untrack_then_track_gets_a_fresh_condition() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;
    let original = engine.conditions.list_for_member(tracking_id, alice.id).await.unwrap();

    engine.tracking_service.untrack(alice.id, tracking_id).await.unwrap();

    // record survives with no members and the condition soft-deleted
    assert!(engine.trackings.find_by_id(tracking_id).await.unwrap().is_some());
    assert!(engine.trackings.member_ids(tracking_id).await.unwrap().is_empty());
    let after_untrack = engine.conditions.list_for_member(tracking_id, alice.id).await.unwrap();
    assert_eq!(after_untrack.len(), 1);
    assert!(!after_untrack[0].active);

    engine.tracking_service.track(alice.id, &product_url(SHOP_ID, ITEM_ID)).await.unwrap();

    let rows = engine.conditions.list_for_member(tracking_id, alice.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    let old = rows
        .iter()
        .find(|c| c.id == original[0].id)
        .unwrap();
    assert!(!old.active);
    let fresh: Vec<_> = rows
        .iter()
        .filter(|c| c.active)
        .collect();
    assert_eq!(fresh.len(), 1);
    assert_ne!(fresh[0].id, original[0].id);
    assert_eq!(engine.trackings.member_ids(tracking_id).await.unwrap(), vec![alice.id]);
}

#[tokio::test]
async fn test_untrack_deactivates_every_condition_of_the_member_only() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let bob = engine.user("bob@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;
    engine.tracking_service.track(bob.id, &product_url(SHOP_ID, ITEM_ID)).await.unwrap();
    engine.conditions
        .insert(tracking_id, alice.id, Condition::Equal { threshold: 50 }).await
        .unwrap();

    engine.tracking_service.untrack(alice.id, tracking_id).await.unwrap();

    let alice_rows = engine.conditions.list_for_member(tracking_id, alice.id).await.unwrap();
    assert_eq!(alice_rows.len(), 2);
    assert!(alice_rows.iter().all(|c| !c.active));

    let bob_active = engine.conditions
        .find_active_with_users(tracking_id, ConditionKind::LessThan).await
        .unwrap();
    assert_eq!(bob_active.len(), 1);
    assert_eq!(bob_active[0].0.user_id, bob.id);
    assert_eq!(bob_active[0].1.as_ref().unwrap().email, "bob@example.com");
}

#[tokio::test]
async fn test_untrack_requires_membership() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let mallory = engine.user("mallory@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;

    let err = engine.tracking_service.untrack(mallory.id, tracking_id).await.unwrap_err();
    assert!(matches!(err, AppError::TrackingNotFound));

    let err = engine.tracking_service.untrack(alice.id, uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::TrackingNotFound));

    // nothing changed for the real member
    assert_eq!(engine.trackings.member_ids(tracking_id).await.unwrap(), vec![alice.id]);
}

#[tokio::test]
async fn test_suspended_record_rejects_new_members() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let bob = engine.user("bob@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;

    engine.tracking_service.set_status(tracking_id, false).await.unwrap();

    let err = engine.tracking_service
        .track(bob.id, &product_url(SHOP_ID, ITEM_ID)).await
        .unwrap_err();
    assert!(matches!(err, AppError::TrackingSuspended));
    assert!(!engine.trackings.is_member(tracking_id, bob.id).await.unwrap());

    // reversible
    engine.tracking_service.set_status(tracking_id, true).await.unwrap();
    engine.tracking_service.track(bob.id, &product_url(SHOP_ID, ITEM_ID)).await.unwrap();
    assert!(engine.trackings.is_member(tracking_id, bob.id).await.unwrap());
}

#[tokio::test]
async fn test_condition_failure_on_new_record_rolls_everything_back() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    engine.crawler.set_listings(SHOP_ID, vec![listing(ITEM_ID, 100)]);
    engine.break_conditions().await;

    let result = engine.tracking_service.track(alice.id, &product_url(SHOP_ID, ITEM_ID)).await;
    assert!(result.is_err());

    assert!(engine.trackings.find_by_external_id(ITEM_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_condition_failure_on_existing_record_removes_new_membership() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let bob = engine.user("bob@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;
    engine.break_conditions().await;

    let result = engine.tracking_service.track(bob.id, &product_url(SHOP_ID, ITEM_ID)).await;
    assert!(result.is_err());

    assert!(!engine.trackings.is_member(tracking_id, bob.id).await.unwrap());
    assert_eq!(engine.trackings.member_ids(tracking_id).await.unwrap(), vec![alice.id]);
}

#[tokio::test]
async fn test_deactivation_failure_restores_membership() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;
    engine.break_conditions().await;

    assert!(engine.tracking_service.untrack(alice.id, tracking_id).await.is_err());
    assert!(engine.trackings.is_member(tracking_id, alice.id).await.unwrap());
}

#[tokio::test]
async fn test_unknown_product_outcomes_are_distinct() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;

    // URL without ids
    let err = engine.tracking_service.track(alice.id, "https://shopee.vn/mall").await.unwrap_err();
    assert!(matches!(err, AppError::ProductNotFound));

    // shop crawl fails: transient, not "not found"
    let err = engine.tracking_service.track(alice.id, &product_url(SHOP_ID, ITEM_ID)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientIo);

    // shop has no products
    engine.crawler.set_listings(SHOP_ID, vec![]);
    let err = engine.tracking_service.track(alice.id, &product_url(SHOP_ID, ITEM_ID)).await.unwrap_err();
    assert!(matches!(err, AppError::ProductNotFound));

    // shop lists other products only
    engine.crawler.set_listings(SHOP_ID, vec![listing(OTHER_ITEM_ID, 500)]);
    let err = engine.tracking_service.track(alice.id, &product_url(SHOP_ID, ITEM_ID)).await.unwrap_err();
    assert!(matches!(err, AppError::ProductNotFound));

    assert!(engine.trackings.find_by_external_id(ITEM_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let engine = TestEngine::new().await;
    engine.crawler.set_listings(SHOP_ID, vec![listing(ITEM_ID, 100)]);

    let err = engine.tracking_service
        .track(uuid::Uuid::new_v4(), &product_url(SHOP_ID, ITEM_ID)).await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_duplicate_membership_is_a_unique_violation() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;

    let err = engine.trackings.add_member(tracking_id, alice.id).await.unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn test_concurrent_join_by_same_user_reports_already_tracking() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let bob = engine.user("bob@example.com").await;
    let tracking_id = engine.track_default(alice.id, 100).await;
    let url = product_url(SHOP_ID, ITEM_ID);

    let (first, second) = tokio::join!(
        engine.tracking_service.track(bob.id, &url),
        engine.tracking_service.track(bob.id, &url)
    );

    let (ok, err): (Vec<_>, Vec<_>) = [first, second].into_iter().partition(|r| r.is_ok());
    assert_eq!(ok.len(), 1);
    let err = err.into_iter().next().unwrap().unwrap_err();
    assert!(matches!(err, AppError::AlreadyTracking));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(engine.conditions.list_for_member(tracking_id, bob.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_first_track_by_two_users_shares_one_record() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    let bob = engine.user("bob@example.com").await;
    engine.crawler.set_listings(SHOP_ID, vec![listing(ITEM_ID, 100), listing(OTHER_ITEM_ID, 500)]);
    let url = product_url(SHOP_ID, ITEM_ID);

    let (first, second) = tokio::join!(
        engine.tracking_service.track(alice.id, &url),
        engine.tracking_service.track(bob.id, &url)
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(first.id, second.id);
    let mut members = engine.trackings.member_ids(first.id).await.unwrap();
    members.sort();
    let mut expected = vec![alice.id, bob.id];
    expected.sort();
    assert_eq!(members, expected);
    assert_eq!(engine.conditions.list_for_member(first.id, alice.id).await.unwrap().len(), 1);
    assert_eq!(engine.conditions.list_for_member(first.id, bob.id).await.unwrap().len(), 1);
    assert_eq!(Shop::find().count(&engine.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_first_track_by_same_user_keeps_one_membership() {
    let engine = TestEngine::new().await;
    let alice = engine.user("alice@example.com").await;
    engine.crawler.set_listings(SHOP_ID, vec![listing(ITEM_ID, 100)]);
    let url = product_url(SHOP_ID, ITEM_ID);

    let (first, second) = tokio::join!(
        engine.tracking_service.track(alice.id, &url),
        engine.tracking_service.track(alice.id, &url)
    );

    let (ok, err): (Vec<_>, Vec<_>) = [first, second].into_iter().partition(|r| r.is_ok());
    assert_eq!(ok.len(), 1);
    assert!(matches!(err.into_iter().next().unwrap(), Err(AppError::AlreadyTracking)));

    let record = engine.trackings.find_by_external_id(ITEM_ID).await.unwrap().unwrap();
    assert_eq!(engine.trackings.member_ids(record.id).await.unwrap(), vec![alice.id]);
    assert_eq!(engine.conditions.list_for_member(record.id, alice.id).await.unwrap().len(), 1);
}
