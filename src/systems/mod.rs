pub(crate) mod achievements;
pub(crate) mod effects;
pub(crate) mod growth;
pub(crate) mod tilling;
pub(crate) mod upgrades;

pub use achievements::qualified_achievements;
pub use effects::SpecialEventSystem;
pub use growth::ProductionSystem;
pub use tilling::AutoTillerSystem;
pub use upgrades::tilling_power;
