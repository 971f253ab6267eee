//! Game state definitions.
//!
//! `GameState` is a value: engine functions take `&GameState` and hand back a
//! fresh one, so a snapshot can be kept around (for saving, for comparison)
//! without worrying about it changing underneath.

use super::balance::{
    EstateBlueprint, ESTATE_BLUEPRINTS, SPECIAL_GROWTH_CYCLE, UPGRADE_BASE_COST,
};

/// An estate slot. Static data lives in the blueprint.
#[derive(Clone, Debug, PartialEq)]
pub struct Estate {
    pub blueprint: &'static EstateBlueprint,
    pub owned: bool,
    /// Accumulated value, credited on sale. Never below the base price.
    pub current_val: f64,
    /// Value added per tick while owned. Equals the blueprint growth when unowned.
    pub growth: f64,
}

impl Estate {
    /// Pristine, purchasable estate.
    pub fn new(blueprint: &'static EstateBlueprint) -> Self {
        Self {
            blueprint,
            owned: false,
            current_val: blueprint.base_price,
            growth: blueprint.growth,
        }
    }

    pub fn id(&self) -> usize {
        self.blueprint.id
    }

    pub fn name(&self) -> &'static str {
        self.blueprint.name
    }

    pub fn desc(&self) -> &'static str {
        self.blueprint.desc
    }

    pub fn base_price(&self) -> f64 {
        self.blueprint.base_price
    }

    pub fn req_level(&self) -> u32 {
        self.blueprint.req_level
    }

    pub fn is_special(&self) -> bool {
        self.blueprint.is_special
    }
}

/// One estate per blueprint, in id order.
pub fn initial_estates() -> Vec<Estate> {
    ESTATE_BLUEPRINTS.iter().map(Estate::new).collect()
}

/// Full state of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Spendable points.
    pub score: f64,
    /// Power upgrade level (drives click power and rank).
    pub up1_level: u32,
    pub up1_cost: f64,
    /// Settlement upgrade level (drives auto income and unlocks).
    pub up2_level: u32,
    pub up2_cost: f64,
    /// Cached rank. Not authoritative: always `compute_rank(up1_level)`.
    pub up3_level: u32,
    /// Ticks into the current world-tree cycle, in `0..SPECIAL_GROWTH_CYCLE`.
    pub world_tree_timer: u32,
    pub estates: Vec<Estate>,
    /// In `0.0..=FOCUS_CAP`.
    pub focus: f64,
    /// Wall-clock ms until which burst is active. 0 = never activated.
    pub burst_active_until: u64,
    /// Wall-clock ms until which burst cannot be re-activated. 0 = ready.
    pub burst_cooldown_until: u64,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            score: 0.0,
            up1_level: 0,
            up1_cost: UPGRADE_BASE_COST,
            up2_level: 0,
            up2_cost: UPGRADE_BASE_COST,
            up3_level: 0,
            world_tree_timer: 0,
            estates: initial_estates(),
            focus: 0.0,
            burst_active_until: 0,
            burst_cooldown_until: 0,
        }
    }

    pub fn estate(&self, id: usize) -> Option<&Estate> {
        self.estates.get(id)
    }

    /// Whether every non-special estate is owned (gate for the special one).
    pub fn all_regular_estates_owned(&self) -> bool {
        self.estates
            .iter()
            .filter(|e| !e.is_special())
            .all(|e| e.owned)
    }

    /// Ticks left until the special estate's next growth boost.
    pub fn ticks_until_tree_boost(&self) -> u32 {
        SPECIAL_GROWTH_CYCLE - self.world_tree_timer
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
