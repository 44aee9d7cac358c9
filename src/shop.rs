//! The shopkeeper: seeds, powerups and growth crystals, bought with oxygen
//! through the ordinary engine operations.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, ShopEffect, TreeKind};
use crate::engine::Engine;
use crate::error::ShopError;
use crate::state::{GameState, Position};

/// A paid-for seed waiting for a plot. Dropping it without planting or
/// cancelling loses the oxygen.
#[derive(Debug, PartialEq)]
#[must_use = "plant or cancel the reservation, or its price is lost"]
pub struct SeedReservation {
    item: String,
    kind: TreeKind,
    price: u64,
}

impl SeedReservation {
    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn item(&self) -> &str {
        &self.item
    }
}

#[derive(Debug, PartialEq)]
pub enum ShopPurchase {
    SeedReserved(SeedReservation),
    BoostApplied { multiplier: f64 },
    TreesMatured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopListing {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub unlocked: bool,
    pub affordable: bool,
}

/// Every shop item with whether it is offered and payable right now.
pub fn listing(state: &GameState, catalog: &Catalog) -> Vec<ShopListing> {
    catalog
        .shop
        .iter()
        .map(|item| ShopListing {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            unlocked: state.highest_oxygen_reached >= item.unlock_threshold,
            affordable: state.oxygen >= item.price,
        })
        .collect()
}

/// Buys `item_id`. A refused purchase spends nothing.
pub fn buy(engine: &mut Engine, item_id: &str) -> Result<ShopPurchase, ShopError> {
    let item = engine
        .catalog()
        .shop_item(item_id)
        .cloned()
        .ok_or_else(|| ShopError::UnknownItem(item_id.to_string()))?;
    let state = engine.state();

    if state.highest_oxygen_reached < item.unlock_threshold {
        return Err(ShopError::Locked {
            item: item.id,
            threshold: item.unlock_threshold,
        });
    }
    if state.oxygen < item.price {
        return Err(ShopError::InsufficientOxygen {
            item: item.id,
            price: item.price,
            available: state.oxygen,
        });
    }
    if matches!(item.effect, ShopEffect::Seed { .. }) && !state.has_tilled_plots() {
        return Err(ShopError::NoTilledPlots);
    }
    if !engine.spend_oxygen(item.price) {
        return Err(ShopError::InsufficientOxygen {
            item: item.id,
            price: item.price,
            available: engine.state().oxygen,
        });
    }
    debug!(item = %item.id, price = item.price, "shop purchase");

    Ok(match item.effect {
        ShopEffect::Seed { tree } => ShopPurchase::SeedReserved(SeedReservation {
            item: item.id,
            kind: tree,
            price: item.price,
        }),
        ShopEffect::Powerup { multiplier } => {
            engine.add_click_power_boost(multiplier);
            ShopPurchase::BoostApplied { multiplier }
        }
        ShopEffect::GrowthCrystal => {
            engine.mature_all_trees();
            ShopPurchase::TreesMatured
        }
    })
}

/// Plants a reserved seed. On failure the price goes back to the player.
pub fn plant_seed(engine: &mut Engine, reservation: SeedReservation, position: Position) -> bool {
    if engine.plant_tree(reservation.kind, position) {
        return true;
    }
    cancel(engine, reservation);
    false
}

pub fn cancel(engine: &mut Engine, reservation: SeedReservation) {
    debug!(item = %reservation.item, "seed refunded");
    engine.add_oxygen(reservation.price as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::GameConfig;
    use crate::engine::EngineBuilder;

    fn engine(oxygen: u64) -> Engine {
        let mut config = GameConfig::grove();
        config.catalog.achievements.clear();
        config.catalog.starting_oxygen = oxygen;
        EngineBuilder::from_config(config).build()
    }

    fn till_fully(engine: &mut Engine, position: Position) {
        while engine.till_box(position) {}
    }

    #[test]
    fn unknown_and_locked_items_are_refused() {
        let mut engine = engine(40);
        assert_eq!(
            buy(&mut engine, "magic-bean"),
            Err(ShopError::UnknownItem("magic-bean".into()))
        );
        assert_eq!(
            buy(&mut engine, "pine-seed"),
            Err(ShopError::Locked {
                item: "pine-seed".into(),
                threshold: 50
            })
        );
        assert_eq!(engine.state().oxygen, 40);
    }

    #[test]
    fn seed_needs_a_tilled_plot() {
        let mut engine = engine(40);
        assert_eq!(buy(&mut engine, "oak-seed"), Err(ShopError::NoTilledPlots));
        assert_eq!(engine.state().oxygen, 40);
    }

    #[test]
    fn planted_seed_keeps_the_price() {
        let mut engine = engine(40);
        till_fully(&mut engine, 0);
        let Ok(ShopPurchase::SeedReserved(seed)) = buy(&mut engine, "oak-seed") else {
            panic!("seed purchase refused");
        };
        assert_eq!(engine.state().oxygen, 39);
        assert!(plant_seed(&mut engine, seed, 0));
        assert_eq!(engine.state().oxygen, 39);
        assert_eq!(engine.state().planted_trees.len(), 1);
    }

    #[test]
    fn failed_planting_refunds() {
        let mut engine = engine(40);
        till_fully(&mut engine, 0);
        let Ok(ShopPurchase::SeedReserved(seed)) = buy(&mut engine, "oak-seed") else {
            panic!("seed purchase refused");
        };
        // plot 1 was never tilled
        assert!(!plant_seed(&mut engine, seed, 1));
        let state = engine.state();
        assert_eq!(state.oxygen, 40);
        assert!(state.planted_trees.is_empty());
        // refunds count as generated oxygen
        assert_eq!(state.total_oxygen_generated, 1.0);
    }

    #[test]
    fn powerup_boosts_and_crystal_matures() {
        let mut engine = engine(1_000);
        assert_eq!(
            buy(&mut engine, "oxygen-surge"),
            Ok(ShopPurchase::BoostApplied { multiplier: 2.0 })
        );
        assert_eq!(engine.state().click_power, 2.0);

        till_fully(&mut engine, 0);
        assert!(engine.plant_tree(TreeKind::Oak, 0));
        assert_eq!(
            buy(&mut engine, "growth-crystal"),
            Ok(ShopPurchase::TreesMatured)
        );
        let state = engine.state();
        assert!(state.planted_trees.iter().all(|tree| tree.is_mature()));
        assert_eq!(state.oxygen, 1_000 - 100 - 300);
    }

    #[test]
    fn listing_flags_lock_and_price() {
        let catalog = Catalog::grove();
        let mut state = GameState::new(&catalog);
        state.oxygen = 60;
        state.highest_oxygen_reached = 60;
        let items = listing(&state, &catalog);
        let pine = items.iter().find(|item| item.id == "pine-seed").unwrap();
        assert!(pine.unlocked && pine.affordable);
        let willow = items.iter().find(|item| item.id == "willow-seed").unwrap();
        assert!(!willow.unlocked && !willow.affordable);
    }
}
