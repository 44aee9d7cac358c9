use std::time::Duration;

use oxygrove::{
    engine::EngineBuilder, error::RuntimeError, runtime, GameConfig, TreeKind, UpgradeId,
};
use tokio_stream::StreamExt;

fn quiet_config() -> GameConfig {
    let mut config = GameConfig::grove();
    config.catalog.achievements.clear();
    config.timings.special_event_chance = 0.0;
    config
}

#[tokio::test(start_paused = true)]
async fn clock_follows_runtime_time() {
    let engine = EngineBuilder::from_config(quiet_config()).build();
    let (handle, task) = runtime::spawn(engine, Duration::from_millis(100));

    for _ in 0..30 {
        assert!(handle.till_box(0).await.unwrap());
    }
    assert!(!handle.till_box(0).await.unwrap());
    assert!(handle.plant_tree(TreeKind::Oak, 0).await.unwrap());

    tokio::time::sleep(Duration::from_secs(62)).await;
    let state = handle.latest();
    assert!(state.planted_trees[0].is_mature());
    assert_eq!(state.total_clicks, 30);

    handle.shutdown().await.unwrap();
    let engine = task.await.unwrap().unwrap();
    assert!(engine.now() >= 61_000);
    assert!(engine.state().oxygen >= 2);
}

#[tokio::test(start_paused = true)]
async fn boost_expires_in_real_time() {
    let engine = EngineBuilder::from_config(quiet_config()).build();
    let (handle, _task) = runtime::spawn(engine, Duration::from_millis(250));

    handle.add_click_power_boost(4.0).await.unwrap();
    assert_eq!(handle.latest().click_power, 4.0);

    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(handle.snapshot().await.unwrap().state.click_power, 4.0);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.snapshot().await.unwrap().state.click_power, 1.0);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_published_states() {
    let mut config = quiet_config();
    config.catalog.starting_oxygen = 100;
    let engine = EngineBuilder::from_config(config).build();
    let (handle, _task) = runtime::spawn(engine, Duration::from_millis(100));
    let mut states = handle.snapshots();

    let first = states.next().await.unwrap();
    assert_eq!(first.oxygen, 100);

    assert!(handle
        .purchase_upgrade(UpgradeId::new("sharp-hoe"), None)
        .await
        .unwrap());
    let next = states.next().await.unwrap();
    assert_eq!(next.oxygen, 75);
    assert_eq!(next.tilling_power, 2.0);
}

#[tokio::test(start_paused = true)]
async fn calls_fail_after_shutdown() {
    let engine = EngineBuilder::from_config(quiet_config()).build();
    let (handle, task) = runtime::spawn(engine, Duration::from_millis(100));
    handle.shutdown().await.unwrap();
    task.await.unwrap().unwrap();

    assert!(matches!(
        handle.till_box(0).await,
        Err(RuntimeError::Closed)
    ));
}
