//! Tunables for the playback controller. The scheduler-local constants
//! (`ANIMATION_ID`, `NUM_FRAMES`, `NOW`, `FIRST_ANIMATION_ID`) stay as plain
//! `const`s next to their scheduler rather than living here, the same way the
//! source material keeps them in an anonymous namespace local to each file.

/// How many battle ticks of buffered events the controller tries to stay
/// ahead of playback by, and how it paces the display timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Minimum number of ticks queued beyond `current_time` before the
    /// controller is willing to call itself comfortably buffered (Green).
    pub buffer_time: u32,
    /// Display timer period while playing.
    pub tick_interval_ms: u32,
    /// Number of `WaitTick` events to swallow per timer firing before a tick
    /// actually advances the display; smooths jittery per-tick event volume.
    pub ticks_per_battle_cycle: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            buffer_time: 50,
            tick_interval_ms: 20,
            ticks_per_battle_cycle: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tuned_values() {
        let config = PlaybackConfig::default();
        assert_eq!(config.buffer_time, 50);
        assert_eq!(config.tick_interval_ms, 20);
        assert_eq!(config.ticks_per_battle_cycle, 3);
    }
}
