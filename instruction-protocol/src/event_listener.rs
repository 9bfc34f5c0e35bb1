//! The pull-free, callback-driven contract a combat algorithm uses to report
//! progress. Every callback is self-contained: an implementation can act on it
//! without querying any other state.

use crate::types::{BattleResult, FighterStatus, HitEffect, Side, UnitInfo};

/// Combat event listener.
///
/// A regular battle tick consists of a number of these callbacks, followed by
/// `update_time`. `place_object` always opens a battle (exactly two calls, one
/// per side); `set_result` always closes it.
pub trait EventListener {
    /// Initial setup; exactly two calls (one per side) open a battle.
    fn place_object(&mut self, side: Side, info: UnitInfo);

    /// Ends one battle tick; implementations treat this as a synchronization point.
    fn update_time(&mut self, time: i32, distance: i32);

    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, fighter_count_delta: i32);
    fn land_fighter(&mut self, side: Side, track: i32, fighter_count_delta: i32);
    fn kill_fighter(&mut self, side: Side, track: i32);

    /// `track < 0` encodes the firing unit's beam slot as `-1 - track`; `track >= 0`
    /// is a fighter track. `target < 0` is the opposing unit; `target >= 0` is a
    /// fighter track on the other side. `hit < 0` indicates a miss; otherwise
    /// `effect` applies to the opposing side when a unit (not a fighter) is hit.
    #[allow(clippy::too_many_arguments)]
    fn fire_beam(&mut self, side: Side, track: i32, target: i32, hit: i32, damage: i32, kill: i32, effect: HitEffect);

    /// `effect` always applies to the opposing side on hit.
    fn fire_torpedo(&mut self, side: Side, hit: i32, launcher: i32, torpedo_count_delta: i32, effect: HitEffect);

    /// `value` is in `[0, 100]`.
    fn update_beam(&mut self, side: Side, slot: i32, value: i32);
    /// `value` is in `[0, 100]`.
    fn update_launcher(&mut self, side: Side, slot: i32, value: i32);

    fn move_object(&mut self, side: Side, position: i32);
    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus);

    /// No visible effect is defined for this in the combat algorithm this
    /// contract was distilled from; implementations may keep it a no-op or
    /// route it through the regular hit/explosion path (see the scheduler
    /// implementations' doc comments for the choice made here).
    fn kill_object(&mut self, _side: Side) {}

    /// Reserved for state resync after a discontinuity (e.g. a jump); never
    /// emitted during normal forward playback.
    fn update_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32);
    /// Reserved for state resync after a discontinuity.
    fn update_ammo(&mut self, side: Side, num_torpedoes: i32, num_fighters: i32);
    /// Reserved for state resync after a discontinuity.
    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus);

    /// Final outcome, at most one per battle.
    fn set_result(&mut self, result: BattleResult);

    /// Revokes any animations the implementation has scheduled but not yet
    /// resolved. Not part of the self-contained per-event data above: this is
    /// driven externally (e.g. by a jump) rather than by the combat algorithm's
    /// own tick sequence.
    fn remove_animations(&mut self);
}
