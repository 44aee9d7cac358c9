//! A simple player for headless runs: tills, plants the cheapest seed on
//! offer and buys the cheapest tool it can afford.

use anyhow::Result;
use serde::Serialize;

use crate::catalog::{ShopEffect, UpgradeKind};
use crate::engine::Engine;
use crate::shop::{self, ShopPurchase};
use crate::state::{required_tilling, Position};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AutopilotStats {
    pub clicks: u64,
    pub seeds_planted: u64,
    pub upgrades_bought: u64,
}

pub struct Autopilot {
    clicks_per_second: u32,
    plots: Position,
    stats: AutopilotStats,
}

impl Autopilot {
    pub fn new(clicks_per_second: u32, plots: Position) -> Self {
        Self {
            clicks_per_second,
            plots: plots.max(1),
            stats: AutopilotStats::default(),
        }
    }

    pub fn clicks_per_second(&self) -> u32 {
        self.clicks_per_second
    }

    pub fn stats(&self) -> AutopilotStats {
        self.stats
    }

    /// Plays one second: the configured number of actions, then one second of
    /// game time.
    pub fn play_second(&mut self, engine: &mut Engine) -> Result<()> {
        for _ in 0..self.clicks_per_second {
            self.act(engine);
        }
        engine.advance(1_000)
    }

    /// One player action. Planting beats buying tools, which beats tilling.
    pub fn act(&mut self, engine: &mut Engine) {
        if self.plant_cheapest_seed(engine) || self.buy_cheapest_tool(engine) {
            return;
        }
        if let Some(position) = self.next_plot(engine) {
            if engine.till_box(position) {
                engine.increment_clicks();
                self.stats.clicks += 1;
            }
        }
    }

    fn next_plot(&self, engine: &Engine) -> Option<Position> {
        let state = engine.state();
        (0..self.plots).find(|position| {
            state.tree_at(*position).is_none()
                && state.progress(*position) < required_tilling(*position)
        })
    }

    fn plant_cheapest_seed(&mut self, engine: &mut Engine) -> bool {
        let state = engine.state();
        let Some(position) = state.ready_plot() else {
            return false;
        };
        let seed = shop::listing(&state, engine.catalog())
            .into_iter()
            .filter(|item| item.unlocked && item.affordable)
            .filter(|item| {
                matches!(
                    engine.catalog().shop_item(&item.id).map(|spec| &spec.effect),
                    Some(ShopEffect::Seed { .. })
                )
            })
            .min_by_key(|item| item.price);
        let Some(seed) = seed else {
            return false;
        };

        match shop::buy(engine, &seed.id) {
            Ok(ShopPurchase::SeedReserved(reservation)) => {
                let planted = shop::plant_seed(engine, reservation, position);
                if planted {
                    self.stats.seeds_planted += 1;
                }
                planted
            }
            _ => false,
        }
    }

    fn buy_cheapest_tool(&mut self, engine: &mut Engine) -> bool {
        let state = engine.state();
        let tool = state
            .upgrades
            .values()
            .filter(|upgrade| upgrade.kind == UpgradeKind::Tool && upgrade.price <= state.oxygen)
            .min_by_key(|upgrade| upgrade.price)
            .map(|upgrade| upgrade.id.clone());
        let Some(id) = tool else {
            return false;
        };
        let bought = engine.purchase_upgrade(&id, None);
        if bought {
            self.stats.upgrades_bought += 1;
        }
        bought
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::EngineBuilder;

    #[test]
    fn autopilot_grows_a_grove() {
        let mut engine = EngineBuilder::from_config(GameConfig::grove()).build();
        let mut pilot = Autopilot::new(5, 2);
        for _ in 0..120 {
            pilot.play_second(&mut engine).unwrap();
        }

        let stats = pilot.stats();
        let state = engine.state();
        assert!(stats.clicks > 0);
        assert_eq!(state.total_clicks, stats.clicks);
        assert!(stats.seeds_planted >= 1);
        assert!(!state.planted_trees.is_empty());
        assert_eq!(engine.now(), 120_000);
    }
}
