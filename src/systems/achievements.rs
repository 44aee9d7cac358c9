//! Achievement evaluation in two phases: a pure pass that finds newly
//! qualified achievements, then a grant step that flips each flag and credits
//! its reward together.

use crate::state::GameState;

/// Whether the transition `before -> after` touched anything an achievement
/// condition can observe.
pub(crate) fn triggered(before: &GameState, after: &GameState) -> bool {
    before.oxygen != after.oxygen
        || before.total_clicks != after.total_clicks
        || before.total_oxygen_generated != after.total_oxygen_generated
        || before.planted_trees != after.planted_trees
}

/// Indices of locked achievements whose condition currently holds.
pub fn qualified_achievements(state: &GameState) -> Vec<usize> {
    state
        .achievements
        .iter()
        .enumerate()
        .filter(|(_, achievement)| !achievement.unlocked && achievement.condition.holds(state))
        .map(|(index, _)| index)
        .collect()
}

pub(crate) fn grant(state: &mut GameState, indices: &[usize]) -> Vec<String> {
    let mut unlocked = Vec::new();
    for &index in indices {
        let Some(achievement) = state.achievements.get_mut(index) else {
            continue;
        };
        if achievement.unlocked {
            continue;
        }
        achievement.unlocked = true;
        let reward = achievement.reward;
        unlocked.push(achievement.id.clone());
        state.credit_oxygen(reward as f64);
    }
    unlocked
}

/// Grants until nothing new qualifies; a reward can push oxygen past the next
/// threshold.
pub(crate) fn settle(state: &mut GameState) -> Vec<String> {
    let mut unlocked = Vec::new();
    loop {
        let ready = qualified_achievements(state);
        if ready.is_empty() {
            return unlocked;
        }
        unlocked.extend(grant(state, &ready));
    }
}
