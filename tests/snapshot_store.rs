mod common;

use chrono::{ Duration, Local, Utc };
use sea_orm::{ ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter };

use price_tracker::db::day_window;
use price_tracker::db::entity::{ price_snapshot, PriceSnapshot };

use common::{ commerce, TestEngine, ITEM_ID };

#[tokio::test]
async fn test_two_crawls_in_one_day_collapse_to_one_row() {
    let engine = TestEngine::new().await;
    let owner = engine.user("owner@example.com").await;
    engine.track_default(owner.id, 100).await;
    let product = engine.product(ITEM_ID).await;

    let (start, _) = day_window(Utc::now(), &Local);
    let morning = start + Duration::hours(1);
    let evening = start + Duration::hours(20);

    let first = engine.snapshots.record_snapshot_at(product.id, &commerce(100), morning).await.unwrap();
    let second = engine.snapshots.record_snapshot_at(product.id, &commerce(90), evening).await.unwrap();
    assert_eq!(first, second);

    let rows = PriceSnapshot::find()
        .filter(price_snapshot::Column::ProductId.eq(product.id))
        .all(&engine.db).await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].price, 90);
    // the day's original timestamp is kept
    assert_eq!(rows[0].created_at, morning);
    assert_eq!(rows[0].updated_at, evening);
}

#[tokio::test]
async fn test_separate_days_append_and_latest_two_is_newest_first() {
    let engine = TestEngine::new().await;
    let owner = engine.user("owner@example.com").await;
    engine.track_default(owner.id, 100).await;
    let product = engine.product(ITEM_ID).await;

    let now = Utc::now();
    for (days_ago, price) in [(4, 120), (2, 100), (0, 90)] {
        engine.snapshots
            .record_snapshot_at(product.id, &commerce(price), now - Duration::days(days_ago)).await
            .unwrap();
    }

    let count = PriceSnapshot::find()
        .filter(price_snapshot::Column::ProductId.eq(product.id))
        .count(&engine.db).await
        .unwrap();
    assert_eq!(count, 3);

    let latest = engine.snapshots.latest_two(product.id).await.unwrap();
    let prices: Vec<i64> = latest
        .iter()
        .map(|s| s.price)
        .collect();
    assert_eq!(prices, vec![90, 100]);
}

#[tokio::test]
async fn test_snapshots_are_per_product() {
    let engine = TestEngine::new().await;
    let owner = engine.user("owner@example.com").await;
    engine.track_default(owner.id, 100).await;
    let first = engine.product(ITEM_ID).await;
    let second = engine.product(common::OTHER_ITEM_ID).await;

    let now = Utc::now();
    engine.snapshots.record_snapshot_at(first.id, &commerce(100), now).await.unwrap();
    engine.snapshots.record_snapshot_at(second.id, &commerce(500), now).await.unwrap();

    assert_eq!(engine.snapshots.latest_two(first.id).await.unwrap().len(), 1);
    assert_eq!(engine.snapshots.latest_two(second.id).await.unwrap()[0].price, 500);
}
