use oxygrove::{
    engine::{Engine, EngineBuilder},
    event::{Event, Outcome, Rejection},
    required_tilling, GameConfig, TreeKind, UpgradeId,
};

/// The stock game without achievements, so balances only move when a test
/// moves them.
fn quiet_config() -> GameConfig {
    let mut config = GameConfig::grove();
    config.catalog.achievements.clear();
    config
}

fn build_engine(config: GameConfig) -> Engine {
    EngineBuilder::from_config(config).build()
}

fn till_ready(engine: &mut Engine, position: u32) {
    for _ in 0..required_tilling(position) {
        assert!(engine.till_box(position));
    }
}

#[test]
fn thirty_tills_ready_the_first_plot() {
    let mut engine = build_engine(quiet_config());

    till_ready(&mut engine, 0);
    assert_eq!(engine.state().progress(0), 30);
    assert!(engine.has_tilled_plots());
    assert!(!engine.till_box(0));
    assert_eq!(engine.state().progress(0), 30);

    assert!(engine.plant_tree(TreeKind::Oak, 0));
    assert_eq!(engine.state().progress(0), 0);
    // occupied now
    assert!(!engine.till_box(0));
}

#[test]
fn oak_matures_after_sixty_ticks_then_produces() {
    let mut engine = build_engine(quiet_config());
    till_ready(&mut engine, 0);
    assert!(engine.plant_tree(TreeKind::Oak, 0));
    let start = engine.state().oxygen;

    engine.advance(59_000).unwrap();
    assert!(!engine.state().planted_trees[0].is_mature());

    engine.advance(1_000).unwrap();
    let state = engine.state();
    assert_eq!(state.planted_trees[0].matured_at, Some(60_000));
    assert_eq!(state.oxygen, start);
    assert!(state
        .recently_matured_trees
        .contains_key(&state.planted_trees[0].id));

    for extra in 1..=5u64 {
        engine.advance(1_000).unwrap();
        assert_eq!(engine.state().oxygen, start + extra);
    }
    // the mark clears after two seconds
    assert!(engine.state().recently_matured_trees.is_empty());
    assert_eq!(engine.state().planted_trees[0].matured_at, Some(60_000));
    assert_eq!(engine.auto_generation(), 1.0);
}

#[test]
fn removing_a_freshly_matured_tree_leaves_oxygen_alone() {
    let mut config = quiet_config();
    config.timings.special_event_chance = 0.0;
    let mut engine = build_engine(config);
    till_ready(&mut engine, 0);
    assert!(engine.plant_tree(TreeKind::Oak, 0));
    engine.advance(60_000).unwrap();

    let id = engine.state().planted_trees[0].id.clone();
    assert!(engine.state().recently_matured_trees.contains_key(&id));
    let oxygen = engine.state().oxygen;

    engine.remove_tree(&id);
    assert!(engine.state().planted_trees.is_empty());
    assert_eq!(engine.state().oxygen, oxygen);
    assert_eq!(engine.pending_timers(), 1);

    // the mark's expiry still fires and only clears the mark
    engine.advance(2_000).unwrap();
    let state = engine.state();
    assert!(state.recently_matured_trees.is_empty());
    assert!(state.planted_trees.is_empty());
    assert_eq!(state.oxygen, oxygen);
    assert_eq!(engine.pending_timers(), 0);
    assert!(engine.till_box(0));
}

#[test]
fn click_boost_reverts_regardless_of_other_changes() {
    let mut engine = build_engine(quiet_config());
    engine.add_click_power_boost(2.0);
    assert_eq!(engine.state().click_power, 2.0);

    engine.advance(100_000).unwrap();
    till_ready(&mut engine, 0);
    engine.add_oxygen(500.0);
    assert!(engine.purchase_upgrade(&UpgradeId::new("sharp-hoe"), None));
    assert_eq!(engine.state().click_power, 2.0);

    engine.advance(200_000).unwrap();
    assert_eq!(engine.state().click_power, 1.0);
}

#[test]
fn unaffordable_upgrade_changes_nothing() {
    let mut config = quiet_config();
    config.catalog.starting_oxygen = 5;
    config.catalog.upgrades[0].price = 10;
    let mut engine = build_engine(config);
    let before = engine.state();
    let revision = engine.revision();

    let outcome = engine.dispatch(Event::PurchaseUpgrade {
        id: UpgradeId::new("sharp-hoe"),
        position: None,
    });
    assert_eq!(
        outcome,
        Outcome::Rejected(Rejection::InsufficientOxygen {
            needed: 10,
            available: 5
        })
    );
    assert_eq!(*engine.state(), *before);
    assert_eq!(engine.revision(), revision);
    assert!(outcome.rejection().is_some());
}

#[test]
fn automation_tills_its_bound_plot() {
    let mut config = quiet_config();
    config.catalog.starting_oxygen = 100;
    let mut engine = build_engine(config);

    assert!(engine.purchase_upgrade(&UpgradeId::new("garden-gnome"), Some(1)));
    assert_eq!(engine.state().oxygen, 0);

    engine.advance(10_000).unwrap();
    assert_eq!(engine.state().progress(1), 10);
    assert_eq!(engine.state().progress(0), 0);
}

#[test]
fn tool_upgrades_raise_tilling_power() {
    let mut config = quiet_config();
    config.catalog.starting_oxygen = 200;
    let mut engine = build_engine(config);

    assert!(engine.purchase_upgrade(&UpgradeId::new("sharp-hoe"), None));
    assert!(engine.purchase_upgrade(&UpgradeId::new("sharp-hoe"), None));
    assert_eq!(engine.state().tilling_power, 3.0);
    assert!(engine.till_box(0));
    assert_eq!(engine.state().progress(0), 3);
}

#[test]
fn special_event_ends_after_its_duration() {
    let mut config = quiet_config();
    config.timings.special_event_chance = 1.0;
    let mut engine = build_engine(config);

    engine.advance(60_000).unwrap();
    let state = engine.state();
    assert!(state.special_event_active);
    let multiplier = state.special_event_multiplier;
    assert!([2, 3, 4].contains(&multiplier));
    assert_eq!(engine.display_multiplier(), f64::from(multiplier));

    engine.advance(30_000).unwrap();
    let state = engine.state();
    assert!(!state.special_event_active);
    assert_eq!(state.special_event_multiplier, 1);
}

#[test]
fn same_seed_same_events() {
    let run = |seed: u64| {
        let mut config = quiet_config();
        config.seed = seed;
        config.timings.special_event_chance = 0.5;
        config.timings.special_event_duration_ms = 1_000;
        let mut engine = build_engine(config);
        let mut seen = Vec::new();
        for _ in 0..20 {
            engine.advance(60_000).unwrap();
            seen.push(engine.state().special_event_multiplier);
        }
        seen
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn achievements_pay_out_once() {
    let mut engine = EngineBuilder::from_config(GameConfig::grove()).build();
    engine.add_oxygen(9.0);
    // first-breath: 10 oxygen reached, reward 5
    assert_eq!(engine.state().oxygen, 15);
    assert!(engine.spend_oxygen(15));
    engine.add_oxygen(10.0);
    assert_eq!(engine.state().oxygen, 10);
    let unlocked = engine
        .state()
        .achievements
        .iter()
        .filter(|a| a.unlocked)
        .count();
    assert_eq!(unlocked, 1);
}

#[test]
fn overdraft_is_refused() {
    let mut engine = build_engine(quiet_config());
    assert!(!engine.spend_oxygen(2));
    assert_eq!(engine.state().oxygen, 1);
    assert!(engine.spend_oxygen(1));
    assert_eq!(engine.state().oxygen, 0);
    assert_eq!(engine.state().highest_oxygen_reached, 1);
}
