//! Balance table: every tuning number the engine reads.
//!
//! Pure data. Times are wall-clock milliseconds, levels are upgrade levels.

/// Simulation tick interval.
pub const TICK_MS: u64 = 1000;

/// Highest rank reachable through the power upgrade.
pub const MAX_RANK: u32 = 5;

// ── Upgrades ────────────────────────────────────────────────────
pub const UPGRADE_BASE_COST: f64 = 100.0;
/// Each purchase multiplies the cost by this factor (then rounds up).
pub const UPGRADE_COST_FACTOR: f64 = 1.1;
/// Highest upgrade level a save may restore. Leaves headroom for purchases.
pub const MAX_STORED_LEVEL: u32 = 1_000_000_000;

// ── Focus ───────────────────────────────────────────────────────
pub const FOCUS_UNLOCK_LEVEL: u32 = 40;
pub const FOCUS_PER_CLICK: f64 = 5.0;
pub const FOCUS_DECAY_PER_TICK: f64 = 3.0;
pub const FOCUS_CAP: f64 = 100.0;

// ── Burst ───────────────────────────────────────────────────────
pub const BURST_UNLOCK_LEVEL: u32 = 70;
pub const BURST_FOCUS_COST: f64 = 60.0;
pub const BURST_DURATION_MS: u64 = 12_000;
pub const BURST_COOLDOWN_MS: u64 = 45_000;
pub const BURST_MULTIPLIER: f64 = 3.0;

// ── Endgame ─────────────────────────────────────────────────────
pub const ENDGAME_BOOST_START_LEVEL: u32 = 90;
pub const ENDGAME_BOOST_PER_LEVEL: f64 = 0.01;
pub const ENDGAME_BOOST_MAX: f64 = 0.75;

// ── Special estate ──────────────────────────────────────────────
/// Growth added to the special estate once per completed cycle.
pub const SPECIAL_GROWTH_BOOST: f64 = 5521.0;
/// Ticks per world-tree cycle.
pub const SPECIAL_GROWTH_CYCLE: u32 = 10;

/// Upper bound for any number read back from storage.
pub const MAX_STORED_NUMBER: f64 = 9_007_199_254_740_991.0;

/// Static description of a purchasable estate.
#[derive(Clone, Debug, PartialEq)]
pub struct EstateBlueprint {
    pub id: usize,
    pub name: &'static str,
    pub desc: &'static str,
    pub base_price: f64,
    /// Value added to the estate each tick while owned.
    pub growth: f64,
    /// Minimum settlement (upgrade 2) level required to buy.
    pub req_level: u32,
    /// The special estate requires every other estate to be owned first.
    pub is_special: bool,
}

/// All estates, indexed by id.
pub static ESTATE_BLUEPRINTS: [EstateBlueprint; 4] = [
    EstateBlueprint {
        id: 0,
        name: "Fairy Kingdom Erpien",
        desc: "The fairy kingdom of Erpien!",
        base_price: 200_000.0,
        growth: 1_000.0,
        req_level: 30,
        is_special: false,
    },
    EstateBlueprint {
        id: 1,
        name: "Witch Kingdom Belitien",
        desc: "Huh? Is this treason?",
        base_price: 500_000.0,
        growth: 4_000.0,
        req_level: 60,
        is_special: false,
    },
    EstateBlueprint {
        id: 2,
        name: "Monatium",
        desc: "A city of elves!",
        base_price: 1_500_000.0,
        growth: 10_000.0,
        req_level: 90,
        is_special: false,
    },
    EstateBlueprint {
        id: 3,
        name: "World Tree Order",
        desc: "I'm the boss now!",
        base_price: 927_000_000.0,
        growth: 5_521.0,
        req_level: 150,
        is_special: true,
    },
];

/// Look up a blueprint by id.
pub fn blueprint(id: usize) -> Option<&'static EstateBlueprint> {
    ESTATE_BLUEPRINTS.get(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blueprint_ids_match_positions() {
        for (i, bp) in ESTATE_BLUEPRINTS.iter().enumerate() {
            assert_eq!(bp.id, i);
        }
    }

    #[test]
    fn exactly_one_special_estate() {
        let specials = ESTATE_BLUEPRINTS.iter().filter(|bp| bp.is_special).count();
        assert_eq!(specials, 1);
    }

    #[test]
    fn burst_ends_before_cooldown() {
        assert!(BURST_DURATION_MS < BURST_COOLDOWN_MS);
    }

    #[test]
    fn unknown_blueprint_is_none() {
        assert!(blueprint(ESTATE_BLUEPRINTS.len()).is_none());
        assert_eq!(blueprint(3).map(|bp| bp.is_special), Some(true));
    }
}
