//! Shuffles events a few ticks ahead of when they are reported, so playback
//! reads as more fluent than the strictly-in-order scheduler. Most notably,
//! torpedoes are queued far enough ahead that their animation has time to
//! play out before the tick that actually resolves them.
//!
//! Events are staged into a ring of [`NUM_FRAMES`] frames, each carrying a
//! `pre` and `post` list exactly like [`crate::standard::StandardScheduler`]'s
//! single pair. `updateTime` (mapped here to [`EventListener::update_time`])
//! advances the ring by one frame, flushing whichever frame has reached the
//! end of the pipe. Exactly how far ahead each event type is staged, and how
//! many frames a flush advances by, is load-bearing for how the playback
//! feels and is carried over unchanged rather than retuned.

use instruction_protocol::{
    BattleResult, EventListener, FighterStatus, HitEffect, ScheduledEvent, ScheduledEventConsumer,
    ScheduledEventKind, Side, UnitInfo,
};

/// Ring depth. Staging an event at offset `k` from [`NOW`] means it reaches
/// the end of the ring, and so gets emitted, after `NUM_FRAMES - 1 - (NOW + k)`
/// shifts.
const NUM_FRAMES: usize = 10;
/// The slot ordinary same-tick events are staged into.
const NOW: usize = 2;
/// Animation ids start at 1, not 0, and are assigned in the order their
/// events are staged (not the order they will eventually be emitted).
const FIRST_ANIMATION_ID: i32 = 1;

#[derive(Default, Clone)]
struct Frame {
    pre: Vec<ScheduledEvent>,
    post: Vec<ScheduledEvent>,
}

pub struct InterleavedScheduler<C> {
    consumer: C,
    queue: [Frame; NUM_FRAMES],
    animation_counter: i32,
    finished: bool,
}

impl<C> InterleavedScheduler<C>
where
    C: ScheduledEventConsumer,
{
    pub fn new(consumer: C) -> Self {
        Self {
            consumer,
            queue: std::array::from_fn(|_| Frame::default()),
            animation_counter: FIRST_ANIMATION_ID,
            finished: false,
        }
    }

    pub fn into_inner(self) -> C {
        self.consumer
    }

    fn next_animation_id(&mut self) -> i32 {
        let id = self.animation_counter;
        self.animation_counter += 1;
        id
    }

    fn render_hit(&mut self, side: Side, effect: HitEffect) {
        let id = self.next_animation_id();
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::HitObject, side)
                .with_a(effect.damage_done)
                .with_b(effect.crew_killed)
                .with_c(effect.shield_lost)
                .with_d(id),
        );
        self.queue[0]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, Side::Left).with_a(id));
    }

    /// Advances the ring by one frame (or, once the battle is finished, by
    /// the whole ring depth so every remaining staged event drains out),
    /// flushing the frame that reaches the end of the pipe on each step.
    fn shift(&mut self) {
        let count = if self.finished { NUM_FRAMES } else { 1 };
        for _ in 0..count {
            let final_frame = std::mem::take(&mut self.queue[NUM_FRAMES - 1]);
            for event in final_frame.pre {
                self.consumer.push_event(event);
            }
            for event in final_frame.post {
                self.consumer.push_event(event);
            }

            for i in (1..NUM_FRAMES).rev() {
                let (left, right) = self.queue.split_at_mut(i);
                std::mem::swap(&mut left[i - 1], &mut right[0]);
            }
        }
    }
}

impl<C> EventListener for InterleavedScheduler<C>
where
    C: ScheduledEventConsumer,
{
    fn place_object(&mut self, side: Side, info: UnitInfo) {
        self.finished = false;
        self.consumer.place_object(side, info);
    }

    fn update_time(&mut self, time: i32, distance: i32) {
        self.queue[NOW]
            .post
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateTime, Side::Left).with_a(time));
        self.queue[NOW]
            .post
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateDistance, Side::Left).with_a(distance));
        self.queue[NOW]
            .post
            .push(ScheduledEvent::new(ScheduledEventKind::WaitTick, Side::Left));
        self.shift();
    }

    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, fighter_count_delta: i32) {
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::StartFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance),
        );
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateNumFighters, side).with_a(fighter_count_delta));
    }

    fn land_fighter(&mut self, side: Side, track: i32, fighter_count_delta: i32) {
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::RemoveFighter, side).with_a(track));
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateNumFighters, side).with_a(fighter_count_delta));
    }

    fn kill_fighter(&mut self, side: Side, track: i32) {
        let id = self.next_animation_id();
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::ExplodeFighter, side)
                .with_a(track)
                .with_b(id),
        );
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::RemoveFighter, side).with_a(track));
        self.queue[0]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(id));
    }

    fn fire_beam(&mut self, side: Side, track: i32, target: i32, hit: i32, _damage: i32, _kill: i32, effect: HitEffect) {
        if track < 0 {
            let beam_slot = -1 - track;
            let id = self.next_animation_id();
            if target < 0 {
                self.queue[NOW + 2].pre.push(
                    ScheduledEvent::new(ScheduledEventKind::FireBeamShipShip, side)
                        .with_a(beam_slot)
                        .with_b(id),
                );
                self.queue[NOW + 2]
                    .pre
                    .push(ScheduledEvent::new(ScheduledEventKind::BlockBeam, side).with_a(beam_slot));
                self.queue[NOW]
                    .pre
                    .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(id));
                self.queue[NOW]
                    .pre
                    .push(ScheduledEvent::new(ScheduledEventKind::UnblockBeam, side).with_a(beam_slot));
                if hit >= 0 {
                    self.render_hit(side.flip(), effect);
                }
            } else {
                self.queue[NOW + 2].pre.push(
                    ScheduledEvent::new(ScheduledEventKind::FireBeamShipFighter, side)
                        .with_a(target)
                        .with_b(beam_slot)
                        .with_c(id),
                );
                self.queue[NOW + 2]
                    .pre
                    .push(ScheduledEvent::new(ScheduledEventKind::BlockBeam, side).with_a(beam_slot));
                self.queue[NOW]
                    .pre
                    .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(id));
                self.queue[NOW]
                    .pre
                    .push(ScheduledEvent::new(ScheduledEventKind::UnblockBeam, side).with_a(beam_slot));
            }
        } else if target < 0 {
            let id = self.next_animation_id();
            self.queue[NOW + 1].pre.push(
                ScheduledEvent::new(ScheduledEventKind::FireBeamFighterShip, side)
                    .with_a(track)
                    .with_b(id),
            );
            self.queue[NOW]
                .pre
                .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(id));
            if hit >= 0 {
                self.render_hit(side.flip(), effect);
            }
        } else {
            let id = self.next_animation_id();
            self.queue[NOW + 1].pre.push(
                ScheduledEvent::new(ScheduledEventKind::FireBeamFighterFighter, side)
                    .with_a(track)
                    .with_b(target)
                    .with_c(id),
            );
            self.queue[NOW]
                .pre
                .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(id));
        }
    }

    fn fire_torpedo(&mut self, side: Side, hit: i32, launcher: i32, torpedo_count_delta: i32, effect: HitEffect) {
        let id = self.next_animation_id();
        self.queue[NOW + 3].pre.push(
            ScheduledEvent::new(ScheduledEventKind::FireTorpedo, side)
                .with_a(launcher)
                .with_b(hit)
                .with_c(id)
                .with_d(6),
        );
        self.queue[NOW + 3]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateNumTorpedoes, side).with_a(torpedo_count_delta));
        self.queue[NOW + 3]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::BlockLauncher, side).with_a(launcher));
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(id));
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::UnblockLauncher, side).with_a(launcher));
        self.render_hit(side.flip(), effect);
    }

    fn update_beam(&mut self, side: Side, slot: i32, value: i32) {
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateBeam, side).with_a(slot).with_b(value));
    }

    fn update_launcher(&mut self, side: Side, slot: i32, value: i32) {
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateLauncher, side).with_a(slot).with_b(value));
    }

    fn move_object(&mut self, side: Side, position: i32) {
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::MoveObject, side).with_a(position));
    }

    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::MoveFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance)
                .with_d(status as i32),
        );
    }

    fn update_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32) {
        self.finished = false;
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::UpdateObject, side)
                .with_a(damage)
                .with_b(crew)
                .with_c(shield),
        );
    }

    fn update_ammo(&mut self, side: Side, num_torpedoes: i32, num_fighters: i32) {
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::UpdateAmmo, side)
                .with_a(num_torpedoes)
                .with_b(num_fighters),
        );
    }

    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.queue[NOW].pre.push(
            ScheduledEvent::new(ScheduledEventKind::UpdateFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance)
                .with_d(status as i32),
        );
    }

    fn set_result(&mut self, result: BattleResult) {
        self.finished = true;
        self.queue[NOW]
            .pre
            .push(ScheduledEvent::new(ScheduledEventKind::SetResult, Side::Left).with_a(result.to_integer()));
    }

    fn remove_animations(&mut self) {
        for id in FIRST_ANIMATION_ID..self.animation_counter {
            self.consumer.remove_animations(id, id);
        }
        self.animation_counter = FIRST_ANIMATION_ID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingConsumer {
        events: Vec<ScheduledEvent>,
        removed: Vec<(i32, i32)>,
    }

    impl ScheduledEventConsumer for Rc<RefCell<RecordingConsumer>> {
        fn place_object(&mut self, _side: Side, _info: UnitInfo) {}

        fn push_event(&mut self, event: ScheduledEvent) {
            self.borrow_mut().events.push(event);
        }

        fn remove_animations(&mut self, from_id: i32, to_id: i32) {
            self.borrow_mut().removed.push((from_id, to_id));
        }
    }

    #[test]
    fn nothing_is_emitted_until_enough_ticks_have_passed_to_drain_the_ring() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = InterleavedScheduler::new(consumer.clone());
        scheduler.move_object(Side::Left, 10);
        scheduler.update_time(1, 0);
        assert!(consumer.borrow().events.is_empty());
    }

    #[test]
    fn events_drain_after_enough_ticks_have_shifted_them_to_the_front() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = InterleavedScheduler::new(consumer.clone());
        scheduler.move_object(Side::Left, 42);
        for t in 0..(NUM_FRAMES as i32 - 1 - NOW as i32) {
            scheduler.update_time(t, 0);
        }
        let events = consumer.borrow().events.clone();
        assert!(events.iter().any(|e| e.kind == ScheduledEventKind::MoveObject && e.a == 42));
    }

    #[test]
    fn finishing_the_battle_drains_the_entire_ring_in_one_update_time_call() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = InterleavedScheduler::new(consumer.clone());
        scheduler.move_object(Side::Left, 7);
        scheduler.set_result(BattleResult::empty());
        scheduler.update_time(0, 0);

        let events = consumer.borrow().events.clone();
        assert!(events.iter().any(|e| e.kind == ScheduledEventKind::MoveObject && e.a == 7));
        assert!(events.iter().any(|e| e.kind == ScheduledEventKind::SetResult));
    }

    #[test]
    fn remove_animations_clears_every_id_issued_so_far_and_resets_the_counter() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = InterleavedScheduler::new(consumer.clone());
        scheduler.kill_fighter(Side::Left, 0);
        scheduler.kill_fighter(Side::Left, 1);
        scheduler.remove_animations();

        assert_eq!(consumer.borrow().removed, vec![(1, 1), (2, 2)]);
        scheduler.kill_fighter(Side::Right, 0);
        scheduler.remove_animations();
        assert_eq!(consumer.borrow().removed.last(), Some(&(1, 1)));
    }
}
