use std::collections::BTreeMap;

use crate::{
    catalog::{UpgradeId, UpgradeKind},
    event::{Outcome, Rejection},
    state::{GameState, Position, Upgrade},
};

/// `1 + Σ owned × power` over the tool upgrades.
pub fn tilling_power(upgrades: &BTreeMap<UpgradeId, Upgrade>) -> f64 {
    upgrades
        .values()
        .filter(|upgrade| upgrade.kind == UpgradeKind::Tool)
        .fold(1.0, |power, upgrade| {
            power + f64::from(upgrade.owned) * upgrade.power
        })
}

pub(crate) fn purchase(
    state: &mut GameState,
    id: &UpgradeId,
    position: Option<Position>,
) -> Outcome {
    let Some(upgrade) = state.upgrades.get(id) else {
        return Outcome::Rejected(Rejection::UnknownUpgrade { id: id.clone() });
    };
    let (price, kind) = (upgrade.price, upgrade.kind);
    let available = state.oxygen;
    if !state.debit_oxygen(price) {
        return Outcome::Rejected(Rejection::InsufficientOxygen {
            needed: price,
            available,
        });
    }

    if let Some(upgrade) = state.upgrades.get_mut(id) {
        upgrade.owned = upgrade.owned.saturating_add(1);
    }
    state.tilling_power = tilling_power(&state.upgrades);

    if let (UpgradeKind::Automation, Some(position)) = (kind, position) {
        state.auto_tillers.insert(position, id.clone());
    }
    Outcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn funded(oxygen: u64) -> GameState {
        let mut state = GameState::new(&Catalog::grove());
        state.oxygen = oxygen;
        state.highest_oxygen_reached = oxygen;
        state
    }

    #[test]
    fn tool_purchase_recomputes_tilling_power() {
        let mut state = funded(1_000);
        let hoe = UpgradeId::new("sharp-hoe");
        let shovel = UpgradeId::new("steel-shovel");
        assert_eq!(purchase(&mut state, &hoe, None), Outcome::Applied);
        assert_eq!(purchase(&mut state, &hoe, None), Outcome::Applied);
        assert_eq!(purchase(&mut state, &shovel, None), Outcome::Applied);
        assert_eq!(state.tilling_power, 1.0 + 2.0 * 1.0 + 3.0);
        assert_eq!(state.oxygen, 1_000 - 25 - 25 - 150);
        assert_eq!(state.upgrades[&hoe].owned, 2);
    }

    #[test]
    fn automation_binds_position_and_overwrites() {
        let mut state = funded(2_000);
        let gnome = UpgradeId::new("garden-gnome");
        let golem = UpgradeId::new("tilling-golem");
        purchase(&mut state, &gnome, Some(4));
        assert_eq!(state.auto_tillers.get(&4), Some(&gnome));
        purchase(&mut state, &golem, Some(4));
        assert_eq!(state.auto_tillers.get(&4), Some(&golem));
        assert_eq!(state.tilling_power, 1.0);

        purchase(&mut state, &gnome, None);
        assert_eq!(state.auto_tillers.len(), 1);
        assert_eq!(state.upgrades[&gnome].owned, 2);
    }

    #[test]
    fn tools_never_bind_auto_tillers() {
        let mut state = funded(100);
        purchase(&mut state, &UpgradeId::new("sharp-hoe"), Some(0));
        assert!(state.auto_tillers.is_empty());
    }

    #[test]
    fn unaffordable_purchase_changes_nothing() {
        let mut state = funded(5);
        let before = state.clone();
        assert_eq!(
            purchase(&mut state, &UpgradeId::new("sharp-hoe"), None),
            Outcome::Rejected(Rejection::InsufficientOxygen {
                needed: 25,
                available: 5
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_upgrade_is_rejected() {
        let mut state = funded(500);
        assert!(matches!(
            purchase(&mut state, &UpgradeId::new("jetpack"), None),
            Outcome::Rejected(Rejection::UnknownUpgrade { .. })
        ));
    }
}
