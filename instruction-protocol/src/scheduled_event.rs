//! The flat, queueable representation a scheduler assembles ahead of replaying
//! it through an [`crate::event_listener::EventListener`]. Where the listener
//! contract is a set of distinct calls, a `ScheduledEvent` is a single closed
//! sum type so a scheduler can buffer, reorder, and interleave events before
//! they are ever dispatched.

/// Closed set of event shapes a scheduler can produce.
///
/// The order here matches the discriminator order the schedulers were built
/// against; it has no semantic meaning beyond providing a stable `as i32` for
/// anything that logs or indexes by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEventKind {
    UpdateTime,
    UpdateDistance,
    MoveObject,
    StartFighter,
    RemoveFighter,
    UpdateNumFighters,
    MoveFighter,
    UpdateFighter,
    ExplodeFighter,
    FireBeamShipFighter,
    FireBeamShipShip,
    FireBeamFighterShip,
    FireBeamFighterFighter,
    BlockBeam,
    UnblockBeam,
    UpdateBeam,
    FireTorpedo,
    UpdateNumTorpedoes,
    BlockLauncher,
    UnblockLauncher,
    UpdateLauncher,
    UpdateObject,
    UpdateAmmo,
    HitObject,
    SetResult,
    WaitTick,
    WaitAnimation,
}

/// One scheduled event: a kind plus the side it concerns and up to five
/// general-purpose integer fields. Which of `a..e` are meaningful, and what
/// they mean, depends on `kind`; see the scheduler modules for the mapping
/// each one builds and reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub kind: ScheduledEventKind,
    pub side: crate::types::Side,
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub d: i32,
    pub e: i32,
}

impl ScheduledEvent {
    /// Builds an event with all integer fields defaulted to zero.
    pub fn new(kind: ScheduledEventKind, side: crate::types::Side) -> Self {
        Self {
            kind,
            side,
            a: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
        }
    }

    pub fn with_a(mut self, a: i32) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: i32) -> Self {
        self.b = b;
        self
    }

    pub fn with_c(mut self, c: i32) -> Self {
        self.c = c;
        self
    }

    pub fn with_d(mut self, d: i32) -> Self {
        self.d = d;
        self
    }

    pub fn with_e(mut self, e: i32) -> Self {
        self.e = e;
        self
    }
}

/// Sink a scheduler feeds while it assembles a battle, ahead of (and separate
/// from) the eventual `EventListener` replay.
pub trait ScheduledEventConsumer {
    /// Initial unit placement; mirrors `EventListener::place_object` but is
    /// recorded immediately rather than queued, since it precedes any
    /// scheduling decision.
    fn place_object(&mut self, side: crate::types::Side, info: crate::types::UnitInfo);

    /// Appends one event to the schedule.
    fn push_event(&mut self, event: ScheduledEvent);

    /// Revokes animations scheduled for ids in `[from_id, to_id)`, driven by
    /// the scheduler's own bookkeeping rather than by the combat algorithm.
    fn remove_animations(&mut self, from_id: i32, to_id: i32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn builder_leaves_unset_fields_at_zero() {
        let event = ScheduledEvent::new(ScheduledEventKind::MoveObject, Side::Left).with_a(5);
        assert_eq!(event.a, 5);
        assert_eq!(event.b, 0);
        assert_eq!(event.kind, ScheduledEventKind::MoveObject);
    }
}
