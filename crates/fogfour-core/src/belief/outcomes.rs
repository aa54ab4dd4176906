use super::observation::ObservationKey;
use super::state::BeliefState;
use crate::model::board::Board;
use crate::model::world::World;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Successor belief states of one move, keyed by the observation each would produce.
#[derive(Debug, Clone, Default)]
pub struct Outcomes {
    buckets: BTreeMap<ObservationKey, BeliefState>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `world` to the bucket for `key`, creating the bucket on first use.
    pub fn insert(&mut self, key: ObservationKey, plies: usize, world: World) {
        self.buckets
            .entry(key)
            .or_insert_with(|| BeliefState::new(key.mask(), plies))
            .insert(world);
    }

    pub fn get(&self, key: &ObservationKey) -> Option<&BeliefState> {
        self.buckets.get(key)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ObservationKey, BeliefState> {
        self.buckets.iter()
    }

    pub fn belief_states(&self) -> impl Iterator<Item = &BeliefState> + '_ {
        self.buckets.values()
    }

    /// Combined probability mass across every bucket.
    pub fn total_weight(&self) -> f64 {
        self.buckets.values().map(BeliefState::total_weight).sum()
    }

    /// Picks the bucket matching what `actual` reveals and renormalizes it.
    ///
    /// Returns `None` when no predicted world produces that observation.
    pub fn resolve(&self, actual: &Board) -> Option<BeliefState> {
        let key = ObservationKey::observe(actual);
        let mut belief = self.buckets.get(&key)?.clone();
        belief.normalize();
        Some(belief)
    }
}

impl IntoIterator for Outcomes {
    type Item = BeliefState;
    type IntoIter = btree_map::IntoValues<ObservationKey, BeliefState>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_values()
    }
}
