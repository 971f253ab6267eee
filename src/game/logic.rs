//! Simulation engine: pure functions over `GameState`.
//!
//! Every transition takes the current state by reference and returns a
//! [`Step`]: the next state plus a small result describing what happened.
//! A failed transition returns an exact clone of its input.

use super::balance::{
    BURST_COOLDOWN_MS, BURST_DURATION_MS, BURST_FOCUS_COST, BURST_MULTIPLIER,
    BURST_UNLOCK_LEVEL, ENDGAME_BOOST_MAX, ENDGAME_BOOST_PER_LEVEL, ENDGAME_BOOST_START_LEVEL,
    FOCUS_CAP, FOCUS_DECAY_PER_TICK, FOCUS_PER_CLICK, FOCUS_UNLOCK_LEVEL, MAX_RANK,
    SPECIAL_GROWTH_BOOST, SPECIAL_GROWTH_CYCLE, UPGRADE_COST_FACTOR,
};
use super::state::GameState;

/// Next state plus the outcome of the transition that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<R> {
    pub next_state: GameState,
    pub result: R,
}

impl<R> Step<R> {
    fn unchanged(state: &GameState, result: R) -> Self {
        Self {
            next_state: state.clone(),
            result,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickResult {
    /// Points gained from auto income this tick.
    pub auto_gain: f64,
    /// The special estate's growth was raised at the end of this tick.
    pub special_boosted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickResult {
    pub clicks: u32,
    pub gain: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Upgrade1Result {
    pub purchased: bool,
    pub rank_increased: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Upgrade2Result {
    pub purchased: bool,
    /// Settlement level after the attempt. Callers compare it with the level
    /// before the call to detect focus / burst unlocks.
    pub level: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstatePurchaseResult {
    pub purchased: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstateSaleResult {
    pub sold: bool,
    /// Points credited by the sale (the estate's accumulated value).
    pub credited: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstResult {
    pub activated: bool,
}

// ── Derived values ──────────────────────────────────────────────

/// Rank from the power upgrade level.
///
/// One rank per 25 levels up to 100, then a plateau at rank 4 until level
/// 150 grants the final rank.
pub fn compute_rank(up1_level: u32) -> u32 {
    if up1_level < 100 {
        up1_level / 25
    } else if up1_level >= 150 {
        MAX_RANK
    } else {
        4
    }
}

/// Level the next rank arrives at, or `None` at max rank.
pub fn get_next_rank_target(rank: u32) -> Option<u32> {
    if rank >= MAX_RANK {
        None
    } else if rank < 4 {
        Some((rank + 1) * 25)
    } else {
        Some(150)
    }
}

/// Product of `2^i` for `i` in `1..=rank`, i.e. `2^(rank(rank+1)/2)`.
pub fn get_rank_multiplier(rank: u32) -> f64 {
    let rank = rank.min(MAX_RANK);
    2f64.powi((rank * (rank + 1) / 2) as i32)
}

pub fn get_click_power(up1_level: u32, rank: u32) -> f64 {
    (1.0 + up1_level as f64) * get_rank_multiplier(rank)
}

/// Auto income added by the settlement level `level` itself.
fn auto_increment_at(level: u32) -> f64 {
    if level >= 90 {
        1000.0
    } else if level >= 60 {
        200.0
    } else if level >= 30 {
        50.0
    } else {
        10.0
    }
}

/// Sum of per-level increments for levels `1..=up2_level`.
///
/// Closed form per band; levels restored from storage may be very large.
pub fn get_auto_power(up2_level: u32) -> f64 {
    let band = |from: u32, to: u32| -> f64 {
        // Number of levels in `from..=to` that are <= up2_level.
        if up2_level < from {
            0.0
        } else {
            (up2_level.min(to) - from + 1) as f64
        }
    };
    band(1, 29) * 10.0 + band(30, 59) * 50.0 + band(60, 89) * 200.0 + band(90, u32::MAX) * 1000.0
}

/// Increment the next settlement level would add.
pub fn get_next_auto_increment(up2_level: u32) -> f64 {
    auto_increment_at(up2_level.saturating_add(1))
}

/// Multiplier for late settlement levels: 1.0 below the start level, then
/// +1% per level from the start level on, capped at +75%.
pub fn get_endgame_boost(up2_level: u32) -> f64 {
    if up2_level < ENDGAME_BOOST_START_LEVEL {
        return 1.0;
    }
    let boosted_levels = (up2_level - ENDGAME_BOOST_START_LEVEL + 1) as f64;
    1.0 + (boosted_levels * ENDGAME_BOOST_PER_LEVEL).min(ENDGAME_BOOST_MAX)
}

pub fn focus_unlocked(state: &GameState) -> bool {
    state.up2_level >= FOCUS_UNLOCK_LEVEL
}

pub fn burst_unlocked(state: &GameState) -> bool {
    state.up2_level >= BURST_UNLOCK_LEVEL
}

fn focus_multiplier(state: &GameState) -> f64 {
    if focus_unlocked(state) {
        1.0 + state.focus / FOCUS_CAP
    } else {
        1.0
    }
}

fn burst_multiplier(state: &GameState, now_ms: u64) -> f64 {
    if now_ms < state.burst_active_until {
        BURST_MULTIPLIER
    } else {
        1.0
    }
}

/// focus × burst × endgame. Scales both click and auto income.
pub fn calculate_dynamic_multiplier(state: &GameState, now_ms: u64) -> f64 {
    focus_multiplier(state) * burst_multiplier(state, now_ms) * get_endgame_boost(state.up2_level)
}

/// Click power at `now`, with every multiplier applied.
pub fn effective_click_power(state: &GameState, now_ms: u64) -> f64 {
    get_click_power(state.up1_level, state.up3_level) * calculate_dynamic_multiplier(state, now_ms)
}

/// Auto income per tick at `now`, with every multiplier applied.
pub fn effective_auto_power(state: &GameState, now_ms: u64) -> f64 {
    get_auto_power(state.up2_level) * calculate_dynamic_multiplier(state, now_ms)
}

/// Raise a cost by one purchase step.
fn next_cost(cost: f64) -> f64 {
    (cost * UPGRADE_COST_FACTOR).ceil()
}

// ── Tick ────────────────────────────────────────────────────────

/// Advance the economy by one tick.
///
/// Everything is computed from the pre-tick state. The special estate's
/// boost, when a cycle completes, applies from the next tick on.
pub fn run_tick(state: &GameState, now_ms: u64) -> Step<TickResult> {
    let auto_gain = effective_auto_power(state, now_ms);

    let next_timer = state.world_tree_timer + 1;
    let cycle_complete = next_timer >= SPECIAL_GROWTH_CYCLE;
    let mut special_boosted = false;

    let estates = state
        .estates
        .iter()
        .map(|estate| {
            if !estate.owned {
                return estate.clone();
            }
            let mut next = estate.clone();
            next.current_val = estate.current_val + estate.growth;
            if estate.is_special() && cycle_complete {
                next.growth = estate.growth + SPECIAL_GROWTH_BOOST;
                special_boosted = true;
            }
            next
        })
        .collect();

    let focus = if focus_unlocked(state) {
        (state.focus - FOCUS_DECAY_PER_TICK).max(0.0)
    } else {
        0.0
    };

    Step {
        next_state: GameState {
            score: state.score + auto_gain,
            world_tree_timer: if cycle_complete { 0 } else { next_timer },
            estates,
            focus,
            ..state.clone()
        },
        result: TickResult {
            auto_gain,
            special_boosted,
        },
    }
}

// ── Upgrades ────────────────────────────────────────────────────

/// Buy one level of the power upgrade. Recomputes rank.
pub fn purchase_upgrade1(state: &GameState) -> Step<Upgrade1Result> {
    if state.score < state.up1_cost {
        return Step::unchanged(
            state,
            Upgrade1Result {
                purchased: false,
                rank_increased: false,
            },
        );
    }

    let up1_level = state.up1_level.saturating_add(1);
    let rank = compute_rank(up1_level);
    Step {
        next_state: GameState {
            score: state.score - state.up1_cost,
            up1_level,
            up1_cost: next_cost(state.up1_cost),
            up3_level: rank,
            ..state.clone()
        },
        result: Upgrade1Result {
            purchased: true,
            rank_increased: rank > state.up3_level,
        },
    }
}

/// Buy one level of the settlement upgrade.
pub fn purchase_upgrade2(state: &GameState) -> Step<Upgrade2Result> {
    if state.score < state.up2_cost {
        return Step::unchanged(
            state,
            Upgrade2Result {
                purchased: false,
                level: state.up2_level,
            },
        );
    }

    let up2_level = state.up2_level.saturating_add(1);
    Step {
        next_state: GameState {
            score: state.score - state.up2_cost,
            up2_level,
            up2_cost: next_cost(state.up2_cost),
            ..state.clone()
        },
        result: Upgrade2Result {
            purchased: true,
            level: up2_level,
        },
    }
}

// ── Clicks ──────────────────────────────────────────────────────

/// Resolve one manual click.
pub fn apply_main_click(state: &GameState, now_ms: u64) -> Step<ClickResult> {
    let gain = effective_click_power(state, now_ms);
    let focus_gain = if focus_unlocked(state) {
        FOCUS_PER_CLICK
    } else {
        0.0
    };

    Step {
        next_state: GameState {
            score: state.score + gain,
            focus: (state.focus + focus_gain).min(FOCUS_CAP),
            ..state.clone()
        },
        result: ClickResult { clicks: 1, gain },
    }
}

/// Resolve `count` buffered clicks in one transition.
///
/// With focus unlocked every click sees the focus left by the previous one,
/// so the batch walks click by click; the result matches `count` calls to
/// [`apply_main_click`]. Without focus nothing changes between clicks and the
/// batch is a single multiplication.
pub fn apply_buffered_main_clicks(state: &GameState, now_ms: u64, count: u32) -> Step<ClickResult> {
    if count == 0 {
        return Step::unchanged(state, ClickResult { clicks: 0, gain: 0.0 });
    }

    let common = get_click_power(state.up1_level, state.up3_level)
        * burst_multiplier(state, now_ms)
        * get_endgame_boost(state.up2_level);

    if !focus_unlocked(state) {
        let gain = common * count as f64;
        return Step {
            next_state: GameState {
                score: state.score + gain,
                ..state.clone()
            },
            result: ClickResult { clicks: count, gain },
        };
    }

    let mut running_focus = state.focus;
    let mut gain = 0.0;
    for _ in 0..count {
        gain += common * (1.0 + running_focus / FOCUS_CAP);
        running_focus = (running_focus + FOCUS_PER_CLICK).min(FOCUS_CAP);
    }

    Step {
        next_state: GameState {
            score: state.score + gain,
            focus: running_focus,
            ..state.clone()
        },
        result: ClickResult { clicks: count, gain },
    }
}

// ── Estates ─────────────────────────────────────────────────────

/// Exists, not owned, affordable, level requirement met, and for the special
/// estate every regular estate already owned.
pub fn can_buy_estate(state: &GameState, id: usize) -> bool {
    let estate = match state.estate(id) {
        Some(e) => e,
        None => return false,
    };
    if estate.owned {
        return false;
    }
    if state.score < estate.base_price() {
        return false;
    }
    if state.up2_level < estate.req_level() {
        return false;
    }
    if estate.is_special() && !state.all_regular_estates_owned() {
        return false;
    }
    true
}

pub fn buy_estate(state: &GameState, id: usize) -> Step<EstatePurchaseResult> {
    if !can_buy_estate(state, id) {
        return Step::unchanged(state, EstatePurchaseResult { purchased: false });
    }

    let mut next_state = state.clone();
    let estate = &mut next_state.estates[id];
    let price = estate.base_price();
    estate.owned = true;
    estate.current_val = price;
    next_state.score -= price;

    Step {
        next_state,
        result: EstatePurchaseResult { purchased: true },
    }
}

/// Sell an owned estate for its accumulated value. The estate returns to its
/// pristine purchasable form (blueprint growth, value at base price).
pub fn sell_estate(state: &GameState, id: usize) -> Step<EstateSaleResult> {
    let credited = match state.estate(id) {
        Some(e) if e.owned => e.current_val,
        _ => {
            return Step::unchanged(
                state,
                EstateSaleResult {
                    sold: false,
                    credited: 0.0,
                },
            )
        }
    };

    let mut next_state = state.clone();
    let estate = &mut next_state.estates[id];
    estate.owned = false;
    estate.growth = estate.blueprint.growth;
    estate.current_val = estate.base_price();
    next_state.score += credited;

    Step {
        next_state,
        result: EstateSaleResult {
            sold: true,
            credited,
        },
    }
}

// ── Burst ───────────────────────────────────────────────────────

/// Where the burst ability stands at a given moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstPhase {
    /// Settlement level below the unlock level.
    Locked,
    Active { remaining_ms: u64 },
    /// Burst over, cooldown still running.
    Cooldown { remaining_ms: u64 },
    /// Off cooldown but not enough focus.
    Charging,
    Ready,
}

pub fn burst_phase(state: &GameState, now_ms: u64) -> BurstPhase {
    if !burst_unlocked(state) {
        BurstPhase::Locked
    } else if now_ms < state.burst_active_until {
        BurstPhase::Active {
            remaining_ms: state.burst_active_until - now_ms,
        }
    } else if now_ms < state.burst_cooldown_until {
        BurstPhase::Cooldown {
            remaining_ms: state.burst_cooldown_until - now_ms,
        }
    } else if state.focus < BURST_FOCUS_COST {
        BurstPhase::Charging
    } else {
        BurstPhase::Ready
    }
}

pub fn can_activate_burst(state: &GameState, now_ms: u64) -> bool {
    burst_phase(state, now_ms) == BurstPhase::Ready
}

/// Spend focus to start a burst. The cooldown clock starts now, together with
/// the burst itself.
pub fn activate_burst(state: &GameState, now_ms: u64) -> Step<BurstResult> {
    if !burst_unlocked(state)
        || state.focus < BURST_FOCUS_COST
        || now_ms < state.burst_cooldown_until
    {
        return Step::unchanged(state, BurstResult { activated: false });
    }

    Step {
        next_state: GameState {
            focus: state.focus - BURST_FOCUS_COST,
            burst_active_until: now_ms + BURST_DURATION_MS,
            burst_cooldown_until: now_ms + BURST_COOLDOWN_MS,
            ..state.clone()
        },
        result: BurstResult { activated: true },
    }
}

// ── Formatting ──────────────────────────────────────────────────

/// Compact number display: 1.50T / 2.00B / 3.25M / 12.5K / 999.
pub fn format_number(n: f64) -> String {
    if n >= 1e12 {
        format!("{:.2}T", n / 1e12)
    } else if n >= 1e9 {
        format!("{:.2}B", n / 1e9)
    } else if n >= 1e6 {
        format!("{:.2}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.1}K", n / 1e3)
    } else {
        format!("{}", n.floor() as i64)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_state() -> impl Strategy<Value = GameState> {
        (
            0.0f64..1e9,
            0u32..300,
            0u32..200,
            0.0f64..=100.0,
            0u64..100_000,
            0u64..100_000,
        )
            .prop_map(|(score, up1, up2, focus, active, cooldown)| GameState {
                score,
                up1_level: up1,
                up3_level: compute_rank(up1),
                up2_level: up2,
                focus,
                burst_active_until: active,
                burst_cooldown_until: cooldown,
                ..GameState::new()
            })
    }

    proptest! {
        #[test]
        fn prop_rank_monotonic_and_bounded(level in 0u32..10_000) {
            let r = compute_rank(level);
            prop_assert!(r <= MAX_RANK);
            prop_assert!(compute_rank(level + 1) >= r);
        }

        #[test]
        fn prop_cost_strictly_increases(cost in 1.0f64..1e12) {
            let next = next_cost(cost);
            prop_assert!(next > cost);
            prop_assert_eq!(next, next.ceil());
        }

        #[test]
        fn prop_rank_multiplier_closed_form(rank in 0u32..=5) {
            let mut expected = 1.0;
            for i in 1..=rank {
                expected *= 2f64.powi(i as i32);
            }
            prop_assert_eq!(get_rank_multiplier(rank), expected);
        }

        #[test]
        fn prop_auto_power_is_sum_of_increments(level in 0u32..400) {
            let summed: f64 = (1..=level).map(auto_increment_at).sum();
            prop_assert_eq!(get_auto_power(level), summed);
            prop_assert_eq!(
                get_auto_power(level + 1) - get_auto_power(level),
                get_next_auto_increment(level)
            );
        }

        #[test]
        fn prop_endgame_boost_bounded(level in 0u32..100_000) {
            let b = get_endgame_boost(level);
            prop_assert!((1.0..=1.75).contains(&b));
        }

        #[test]
        fn prop_batch_equals_sequential(state in arb_state(), now in 0u64..100_000, n in 0u32..60) {
            let batched = apply_buffered_main_clicks(&state, now, n).next_state;
            let mut seq = state.clone();
            for _ in 0..n {
                seq = apply_main_click(&seq, now).next_state;
            }
            prop_assert!((batched.score - seq.score).abs() <= 1e-9 * seq.score.max(1.0));
            prop_assert!((batched.focus - seq.focus).abs() < 1e-9);
        }

        #[test]
        fn prop_tick_keeps_focus_in_range(state in arb_state(), now in 0u64..100_000) {
            let next = run_tick(&state, now).next_state;
            prop_assert!(next.focus >= 0.0 && next.focus <= FOCUS_CAP);
            prop_assert!(next.score >= state.score);
            prop_assert!(next.world_tree_timer < SPECIAL_GROWTH_CYCLE);
        }

        #[test]
        fn prop_failed_purchase_is_noop(state in arb_state()) {
            let step = purchase_upgrade1(&state);
            if !step.result.purchased {
                prop_assert_eq!(&step.next_state, &state);
            } else {
                prop_assert!(step.next_state.up1_cost > state.up1_cost);
                prop_assert_eq!(step.next_state.up3_level, compute_rank(step.next_state.up1_level));
            }
        }

        #[test]
        fn prop_failed_burst_is_noop(state in arb_state(), now in 0u64..100_000) {
            let step = activate_burst(&state, now);
            if step.result.activated {
                prop_assert!(step.next_state.burst_active_until < step.next_state.burst_cooldown_until);
                prop_assert!(step.next_state.focus >= 0.0);
            } else {
                prop_assert_eq!(&step.next_state, &state);
            }
        }
    }
}
