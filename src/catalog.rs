//! Immutable game data: tree species, upgrades, achievements and shop items.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::GameState;

fn default_starting_oxygen() -> u64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Oak,
    Pine,
    Willow,
}

impl TreeKind {
    pub fn all() -> &'static [TreeKind] {
        &[TreeKind::Oak, TreeKind::Pine, TreeKind::Willow]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TreeKind::Oak => "oak",
            TreeKind::Pine => "pine",
            TreeKind::Willow => "willow",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Tool,
    Automation,
    Powerup,
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeId(String);

impl UpgradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub title: String,
    pub growth_time_ms: u64,
    pub base_production: f64,
    pub base_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeSpec {
    pub id: UpgradeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UpgradeKind,
    pub price: u64,
    pub power: f64,
    #[serde(default)]
    pub description: String,
}

/// Pure predicate over [`GameState`] deciding when an achievement unlocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementCondition {
    OxygenAtLeast { amount: u64 },
    TotalOxygenAtLeast { amount: f64 },
    ClicksAtLeast { clicks: u64 },
    TreesAtLeast { count: usize },
    MatureTreesAtLeast { count: usize },
}

impl AchievementCondition {
    pub fn holds(&self, state: &GameState) -> bool {
        match self {
            AchievementCondition::OxygenAtLeast { amount } => state.oxygen >= *amount,
            AchievementCondition::TotalOxygenAtLeast { amount } => {
                state.total_oxygen_generated >= *amount
            }
            AchievementCondition::ClicksAtLeast { clicks } => state.total_clicks >= *clicks,
            AchievementCondition::TreesAtLeast { count } => state.planted_trees.len() >= *count,
            AchievementCondition::MatureTreesAtLeast { count } => {
                state.mature_tree_count() >= *count
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub condition: AchievementCondition,
    pub reward: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShopEffect {
    Seed { tree: TreeKind },
    Powerup { multiplier: f64 },
    GrowthCrystal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItemSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    /// Highest oxygen the player must have reached before the item is offered.
    #[serde(default)]
    pub unlock_threshold: u64,
    pub effect: ShopEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_starting_oxygen")]
    pub starting_oxygen: u64,
    pub trees: BTreeMap<TreeKind, TreeSpec>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeSpec>,
    #[serde(default)]
    pub achievements: Vec<AchievementSpec>,
    #[serde(default)]
    pub shop: Vec<ShopItemSpec>,
}

impl Catalog {
    pub fn tree(&self, kind: TreeKind) -> Option<&TreeSpec> {
        self.trees.get(&kind)
    }

    pub fn upgrade(&self, id: &UpgradeId) -> Option<&UpgradeSpec> {
        self.upgrades.iter().find(|upgrade| &upgrade.id == id)
    }

    pub fn shop_item(&self, id: &str) -> Option<&ShopItemSpec> {
        self.shop.iter().find(|item| item.id == id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, spec) in &self.trees {
            if spec.growth_time_ms == 0 {
                return Err(ConfigError::ZeroGrowthTime { kind: *kind });
            }
            check_magnitude(format!("trees.{kind}.base_production"), spec.base_production)?;
            check_magnitude(format!("trees.{kind}.base_multiplier"), spec.base_multiplier)?;
        }

        let mut seen = BTreeSet::new();
        for upgrade in &self.upgrades {
            if !seen.insert(upgrade.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    what: "upgrade",
                    id: upgrade.id.to_string(),
                });
            }
            check_magnitude(format!("upgrades.{}.power", upgrade.id), upgrade.power)?;
        }

        let mut seen = BTreeSet::new();
        for achievement in &self.achievements {
            if !seen.insert(achievement.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    what: "achievement",
                    id: achievement.id.clone(),
                });
            }
        }

        let mut seen = BTreeSet::new();
        for item in &self.shop {
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    what: "shop item",
                    id: item.id.clone(),
                });
            }
            match &item.effect {
                ShopEffect::Seed { tree } if self.tree(*tree).is_none() => {
                    return Err(ConfigError::UnknownSeed {
                        item: item.id.clone(),
                        kind: *tree,
                    });
                }
                ShopEffect::Powerup { multiplier } if !(multiplier.is_finite() && *multiplier > 0.0) => {
                    return Err(ConfigError::InvalidMagnitude {
                        field: format!("shop.{}.multiplier", item.id),
                        value: *multiplier,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The stock grove: three species, two tools, two automatons.
    pub fn grove() -> Self {
        let trees = BTreeMap::from([
            (
                TreeKind::Oak,
                TreeSpec {
                    title: "Mighty Oak".into(),
                    growth_time_ms: 60_000,
                    base_production: 1.0,
                    base_multiplier: 0.1,
                },
            ),
            (
                TreeKind::Pine,
                TreeSpec {
                    title: "Evergreen Pine".into(),
                    growth_time_ms: 180_000,
                    base_production: 4.0,
                    base_multiplier: 0.25,
                },
            ),
            (
                TreeKind::Willow,
                TreeSpec {
                    title: "Weeping Willow".into(),
                    growth_time_ms: 600_000,
                    base_production: 15.0,
                    base_multiplier: 0.5,
                },
            ),
        ]);

        let upgrades = vec![
            upgrade("sharp-hoe", "Sharpened Hoe", UpgradeKind::Tool, 25, 1.0),
            upgrade("steel-shovel", "Steel Shovel", UpgradeKind::Tool, 150, 3.0),
            upgrade("garden-gnome", "Garden Gnome", UpgradeKind::Automation, 100, 1.0),
            upgrade("tilling-golem", "Tilling Golem", UpgradeKind::Automation, 750, 5.0),
        ];

        let achievements = vec![
            achievement(
                "first-breath",
                "First Breath",
                AchievementCondition::OxygenAtLeast { amount: 10 },
                5,
            ),
            achievement(
                "green-thumb",
                "Green Thumb",
                AchievementCondition::TreesAtLeast { count: 1 },
                10,
            ),
            achievement(
                "busy-hands",
                "Busy Hands",
                AchievementCondition::ClicksAtLeast { clicks: 100 },
                25,
            ),
            achievement(
                "grove-keeper",
                "Grove Keeper",
                AchievementCondition::MatureTreesAtLeast { count: 5 },
                100,
            ),
            achievement(
                "oxygen-baron",
                "Oxygen Baron",
                AchievementCondition::TotalOxygenAtLeast { amount: 1_000.0 },
                250,
            ),
        ];

        let shop = vec![
            shop_item("oak-seed", "Oak Seed", 1, 0, ShopEffect::Seed { tree: TreeKind::Oak }),
            shop_item("pine-seed", "Pine Seed", 50, 50, ShopEffect::Seed { tree: TreeKind::Pine }),
            shop_item(
                "willow-seed",
                "Willow Seed",
                200,
                200,
                ShopEffect::Seed {
                    tree: TreeKind::Willow,
                },
            ),
            shop_item(
                "oxygen-surge",
                "Oxygen Surge",
                100,
                100,
                ShopEffect::Powerup { multiplier: 2.0 },
            ),
            shop_item("growth-crystal", "Growth Crystal", 300, 300, ShopEffect::GrowthCrystal),
        ];

        Self {
            starting_oxygen: default_starting_oxygen(),
            trees,
            upgrades,
            achievements,
            shop,
        }
    }
}

fn check_magnitude(field: String, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMagnitude { field, value })
    }
}

fn upgrade(id: &str, name: &str, kind: UpgradeKind, price: u64, power: f64) -> UpgradeSpec {
    UpgradeSpec {
        id: UpgradeId::new(id),
        name: name.into(),
        kind,
        price,
        power,
        description: String::new(),
    }
}

fn achievement(id: &str, name: &str, condition: AchievementCondition, reward: u64) -> AchievementSpec {
    AchievementSpec {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        condition,
        reward,
    }
}

fn shop_item(id: &str, name: &str, price: u64, unlock_threshold: u64, effect: ShopEffect) -> ShopItemSpec {
    ShopItemSpec {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        price,
        unlock_threshold,
        effect,
    }
}
