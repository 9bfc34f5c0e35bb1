//! Shared value types threaded through the `EventListener` / `ScheduledEvent`
//! contracts: which side an event belongs to, what a unit looks like, and how
//! a battle can end.

use serde::{Deserialize, Serialize};

/// Which of the two combatants an event or unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Returns the other side.
    pub fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Fighter motion status, hardcoded at several call sites in the source
/// material and therefore kept as a closed, stable set here too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterStatus {
    Idle,
    Attacks,
    Returns,
}

/// Full description of a combat unit, carried by `EventListener::place_object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub id: i32,
    pub owner: i32,
    pub mass: i32,
    pub is_planet: bool,
    pub picture: i32,
    pub beam_type: i32,
    pub num_beams: i32,
    pub torpedo_type: i32,
    pub num_launchers: i32,
    pub num_bays: i32,

    pub damage: i32,
    pub shield: i32,
    pub crew: i32,
    pub num_torpedoes: i32,
    pub num_fighters: i32,

    pub position: i32,
    /// How this unit's owner relates to the viewer (ally, enemy, self, ...);
    /// left as an opaque small integer since team relation policy is a
    /// collaborator concern (the game session object, §6) out of scope here.
    pub owner_relation: i32,
    pub name: String,
    pub owner_name: String,
    pub beam_name: String,
    pub launcher_name: String,
}

/// The delta a weapon hit applies to its recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEffect {
    pub damage_done: i32,
    pub crew_killed: i32,
    pub shield_lost: i32,
}

/// A single outcome bit of a `BattleResult` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResultBit {
    LeftDestroyed,
    RightDestroyed,
    LeftCaptured,
    RightCaptured,
    Timeout,
    Stalemate,
    Invalid,
}

/// Set of outcome bits. Multiple destroyed/captured bits may coexist;
/// `Timeout`/`Stalemate`/`Invalid` are used alone by convention of the
/// producer, not enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult(u8);

impl BattleResult {
    pub fn empty() -> Self {
        Self(0)
    }

    fn mask(bit: BattleResultBit) -> u8 {
        1 << (bit as u8)
    }

    pub fn with(mut self, bit: BattleResultBit) -> Self {
        self.0 |= Self::mask(bit);
        self
    }

    pub fn contains(self, bit: BattleResultBit) -> bool {
        self.0 & Self::mask(bit) != 0
    }

    /// Encodes the set as a single integer, the representation `ScheduledEvent`'s
    /// `SetResult` and the recorder's wire opcode both carry.
    pub fn to_integer(self) -> i32 {
        self.0 as i32
    }

    /// Decodes a previously-encoded integer back into a set.
    pub fn from_integer(value: i32) -> Self {
        Self(value as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_flip_is_an_involution() {
        assert_eq!(Side::Left.flip(), Side::Right);
        assert_eq!(Side::Right.flip().flip(), Side::Right);
    }

    #[test]
    fn battle_result_round_trips_through_integer_encoding() {
        let result = BattleResult::empty()
            .with(BattleResultBit::LeftDestroyed)
            .with(BattleResultBit::RightCaptured);
        let decoded = BattleResult::from_integer(result.to_integer());
        assert!(decoded.contains(BattleResultBit::LeftDestroyed));
        assert!(decoded.contains(BattleResultBit::RightCaptured));
        assert!(!decoded.contains(BattleResultBit::Timeout));
    }
}
