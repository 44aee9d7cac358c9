use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{AchievementCondition, Catalog, TreeKind, UpgradeId, UpgradeKind};

/// Milliseconds on the engine's logical clock.
pub type Millis = u64;
/// Board index of a plot.
pub type Position = u32;

const TILLING_BASE: f64 = 30.0;
const TILLING_GROWTH: f64 = 1.5;
pub const TILLING_CAP: u64 = 10_000;

/// Tilling progress a plot needs before a tree can be planted on it.
pub fn required_tilling(position: Position) -> u64 {
    // 1.5^25 * 30 is far past the cap already
    let exponent = position.min(25) as i32;
    let requirement = (TILLING_BASE * TILLING_GROWTH.powi(exponent)).floor() as u64;
    requirement.min(TILLING_CAP)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(String);

impl TreeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub(crate) fn from_seq(seq: u64) -> Self {
        Self(format!("tree-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantedTree {
    pub id: TreeId,
    pub kind: TreeKind,
    pub planted_at: Millis,
    pub matured_at: Option<Millis>,
    pub position: Position,
}

impl PlantedTree {
    pub fn is_mature(&self) -> bool {
        self.matured_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: UpgradeId,
    pub name: String,
    pub kind: UpgradeKind,
    pub price: u64,
    pub power: f64,
    pub owned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub condition: AchievementCondition,
    pub reward: u64,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub oxygen: u64,
    pub total_oxygen_generated: f64,
    pub highest_oxygen_reached: u64,
    pub click_power: f64,
    /// Factors of the click boosts still running; `click_power` is their product.
    pub click_boosts: Vec<f64>,
    pub tilling_power: f64,
    pub tilled_boxes: BTreeMap<Position, u64>,
    pub planted_trees: Vec<PlantedTree>,
    pub recently_matured_trees: BTreeMap<TreeId, Millis>,
    pub auto_tillers: BTreeMap<Position, UpgradeId>,
    pub upgrades: BTreeMap<UpgradeId, Upgrade>,
    pub achievements: Vec<Achievement>,
    pub special_event_active: bool,
    pub special_event_multiplier: u32,
    pub total_clicks: u64,
    /// Trees planted over the whole session; feeds tree id generation.
    pub trees_planted: u64,
}

impl GameState {
    pub fn new(catalog: &Catalog) -> Self {
        let upgrades: BTreeMap<UpgradeId, Upgrade> = catalog
            .upgrades
            .iter()
            .map(|spec| {
                let upgrade = Upgrade {
                    id: spec.id.clone(),
                    name: spec.name.clone(),
                    kind: spec.kind,
                    price: spec.price,
                    power: spec.power,
                    owned: 0,
                };
                (spec.id.clone(), upgrade)
            })
            .collect();
        let achievements = catalog
            .achievements
            .iter()
            .map(|spec| Achievement {
                id: spec.id.clone(),
                name: spec.name.clone(),
                condition: spec.condition.clone(),
                reward: spec.reward,
                unlocked: false,
            })
            .collect();

        Self {
            oxygen: catalog.starting_oxygen,
            total_oxygen_generated: 0.0,
            highest_oxygen_reached: catalog.starting_oxygen,
            click_power: 1.0,
            click_boosts: Vec::new(),
            tilling_power: crate::systems::tilling_power(&upgrades),
            tilled_boxes: BTreeMap::new(),
            planted_trees: Vec::new(),
            recently_matured_trees: BTreeMap::new(),
            auto_tillers: BTreeMap::new(),
            upgrades,
            achievements,
            special_event_active: false,
            special_event_multiplier: 1,
            total_clicks: 0,
            trees_planted: 0,
        }
    }

    pub fn progress(&self, position: Position) -> u64 {
        self.tilled_boxes.get(&position).copied().unwrap_or(0)
    }

    pub fn tree_at(&self, position: Position) -> Option<&PlantedTree> {
        self.planted_trees
            .iter()
            .find(|tree| tree.position == position)
    }

    pub fn tree(&self, id: &TreeId) -> Option<&PlantedTree> {
        self.planted_trees.iter().find(|tree| &tree.id == id)
    }

    pub fn upgrade(&self, id: &UpgradeId) -> Option<&Upgrade> {
        self.upgrades.get(id)
    }

    /// True when at least one plot is fully tilled.
    pub fn has_tilled_plots(&self) -> bool {
        self.tilled_boxes
            .iter()
            .any(|(position, progress)| *progress >= required_tilling(*position))
    }

    /// A fully tilled plot with no tree on it, lowest position first.
    pub fn ready_plot(&self) -> Option<Position> {
        self.tilled_boxes
            .iter()
            .filter(|(position, progress)| **progress >= required_tilling(**position))
            .map(|(position, _)| *position)
            .find(|position| self.tree_at(*position).is_none())
    }

    pub fn mature_tree_count(&self) -> usize {
        self.planted_trees
            .iter()
            .filter(|tree| tree.is_mature())
            .count()
    }

    /// Oxygen produced per production tick by the matured trees.
    pub fn auto_generation(&self, catalog: &Catalog) -> f64 {
        self.planted_trees
            .iter()
            .filter(|tree| tree.is_mature())
            .filter_map(|tree| catalog.tree(tree.kind))
            .map(|spec| spec.base_production)
            .sum()
    }

    pub fn display_multiplier(&self, catalog: &Catalog) -> f64 {
        let trees: f64 = self
            .planted_trees
            .iter()
            .filter(|tree| tree.is_mature())
            .filter_map(|tree| catalog.tree(tree.kind))
            .map(|spec| spec.base_multiplier)
            .sum();
        (1.0 + trees) * f64::from(self.special_event_multiplier) * self.click_power
    }

    /// Growth of a tree in `[0, 1]`; matured trees report 1.
    pub fn growth_progress(&self, tree: &PlantedTree, catalog: &Catalog, now: Millis) -> f64 {
        if tree.is_mature() {
            return 1.0;
        }
        match catalog.tree(tree.kind) {
            Some(spec) => {
                let elapsed = now.saturating_sub(tree.planted_at) as f64;
                (elapsed / spec.growth_time_ms as f64).clamp(0.0, 1.0)
            }
            None => 0.0,
        }
    }

    /// Credits oxygen, flooring the balance. Non-positive or non-finite amounts are ignored.
    pub fn credit_oxygen(&mut self, amount: f64) {
        if !(amount.is_finite() && amount > 0.0) {
            return;
        }
        self.oxygen = (self.oxygen as f64 + amount).floor() as u64;
        self.total_oxygen_generated += amount;
        self.highest_oxygen_reached = self.highest_oxygen_reached.max(self.oxygen);
    }

    /// Removes `amount` oxygen; refuses and leaves the balance alone if it would go negative.
    pub fn debit_oxygen(&mut self, amount: u64) -> bool {
        match self.oxygen.checked_sub(amount) {
            Some(rest) => {
                self.oxygen = rest;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_grows_and_caps() {
        assert_eq!(required_tilling(0), 30);
        assert_eq!(required_tilling(1), 45);
        assert_eq!(required_tilling(2), 67);
        assert_eq!(required_tilling(14), 8_757);
        assert_eq!(required_tilling(15), TILLING_CAP);
        assert_eq!(required_tilling(Position::MAX), TILLING_CAP);
    }

    #[test]
    fn new_state_seeds_catalog() {
        let catalog = Catalog::grove();
        let state = GameState::new(&catalog);
        assert_eq!(state.oxygen, 1);
        assert_eq!(state.highest_oxygen_reached, 1);
        assert_eq!(state.tilling_power, 1.0);
        assert_eq!(state.upgrades.len(), catalog.upgrades.len());
        assert!(state.upgrades.values().all(|upgrade| upgrade.owned == 0));
        assert!(state.achievements.iter().all(|a| !a.unlocked));
        assert!(!state.has_tilled_plots());
    }

    #[test]
    fn credit_floors_but_tracks_raw_lifetime_total() {
        let mut state = GameState::new(&Catalog::grove());
        state.credit_oxygen(2.75);
        assert_eq!(state.oxygen, 3);
        assert!((state.total_oxygen_generated - 2.75).abs() < 1e-9);
        assert_eq!(state.highest_oxygen_reached, 3);

        state.credit_oxygen(-4.0);
        state.credit_oxygen(f64::NAN);
        assert_eq!(state.oxygen, 3);
    }

    #[test]
    fn debit_refuses_overdraft() {
        let mut state = GameState::new(&Catalog::grove());
        state.credit_oxygen(9.0);
        assert!(!state.debit_oxygen(11));
        assert_eq!(state.oxygen, 10);
        assert!(state.debit_oxygen(10));
        assert_eq!(state.oxygen, 0);
        assert_eq!(state.highest_oxygen_reached, 10);
    }

    #[test]
    fn display_multiplier_counts_mature_trees_only() {
        let catalog = Catalog::grove();
        let mut state = GameState::new(&catalog);
        state.planted_trees.push(PlantedTree {
            id: TreeId::new("a"),
            kind: TreeKind::Pine,
            planted_at: 0,
            matured_at: Some(10),
            position: 0,
        });
        state.planted_trees.push(PlantedTree {
            id: TreeId::new("b"),
            kind: TreeKind::Willow,
            planted_at: 0,
            matured_at: None,
            position: 1,
        });
        state.special_event_multiplier = 2;
        state.click_power = 2.0;
        assert!((state.display_multiplier(&catalog) - 5.0).abs() < 1e-9);
        assert!((state.auto_generation(&catalog) - 4.0).abs() < 1e-9);
    }
}
