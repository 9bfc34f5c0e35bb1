//! Buffers events within one battle tick into two groups and flushes both,
//! each followed by a single shared animation wait, right before the tick's
//! `UpdateTime`/`UpdateDistance`/`WaitTick` trio.
//!
//! - `pre`: placement and state changes (fighters launching, movement,
//!   beams/torpedoes firing, ammo/damage resyncs) — everything that sets up
//!   what this tick looks like.
//! - `post`: the consequences (explosions, hit effects, beam/launcher dial
//!   updates, the battle result) — everything that resolves what `pre` started.
//!
//! The effect: all weapons fire simultaneously, all explosions occur
//! simultaneously, and nothing a tick does leaks into the next one.

use instruction_protocol::{
    BattleResult, EventListener, FighterStatus, HitEffect, ScheduledEvent, ScheduledEventConsumer,
    ScheduledEventKind, Side, UnitInfo,
};

const ANIMATION_ID: i32 = 99;

pub struct StandardScheduler<C> {
    consumer: C,
    pre: Vec<ScheduledEvent>,
    post: Vec<ScheduledEvent>,
}

impl<C> StandardScheduler<C>
where
    C: ScheduledEventConsumer,
{
    pub fn new(consumer: C) -> Self {
        Self {
            consumer,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    pub fn into_inner(self) -> C {
        self.consumer
    }

    fn render_hit(&mut self, side: Side, effect: HitEffect) {
        self.post.push(
            ScheduledEvent::new(ScheduledEventKind::HitObject, side)
                .with_a(effect.damage_done)
                .with_b(effect.crew_killed)
                .with_c(effect.shield_lost)
                .with_d(ANIMATION_ID),
        );
    }
}

impl<C> EventListener for StandardScheduler<C>
where
    C: ScheduledEventConsumer,
{
    fn place_object(&mut self, side: Side, info: UnitInfo) {
        self.consumer.place_object(side, info);
    }

    fn update_time(&mut self, time: i32, distance: i32) {
        let had_pre = !self.pre.is_empty();
        for event in self.pre.drain(..) {
            self.consumer.push_event(event);
        }
        if had_pre {
            self.consumer
                .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, Side::Left).with_a(ANIMATION_ID));
        }

        let had_post = !self.post.is_empty();
        for event in self.post.drain(..) {
            self.consumer.push_event(event);
        }
        if had_post {
            self.consumer
                .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, Side::Left).with_a(ANIMATION_ID));
        }

        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::UpdateTime, Side::Left).with_a(time));
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::UpdateDistance, Side::Left).with_a(distance));
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::WaitTick, Side::Left));
    }

    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, fighter_count_delta: i32) {
        self.pre.push(
            ScheduledEvent::new(ScheduledEventKind::StartFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance),
        );
        self.pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateNumFighters, side).with_a(fighter_count_delta));
    }

    fn land_fighter(&mut self, side: Side, track: i32, fighter_count_delta: i32) {
        self.pre
            .push(ScheduledEvent::new(ScheduledEventKind::RemoveFighter, side).with_a(track));
        self.pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateNumFighters, side).with_a(fighter_count_delta));
    }

    fn kill_fighter(&mut self, side: Side, track: i32) {
        self.post.push(
            ScheduledEvent::new(ScheduledEventKind::ExplodeFighter, side)
                .with_a(track)
                .with_b(ANIMATION_ID),
        );
        self.post
            .push(ScheduledEvent::new(ScheduledEventKind::RemoveFighter, side).with_a(track));
    }

    fn fire_beam(&mut self, side: Side, track: i32, target: i32, hit: i32, _damage: i32, _kill: i32, effect: HitEffect) {
        if track < 0 {
            let beam_slot = -1 - track;
            if target < 0 {
                self.pre.push(
                    ScheduledEvent::new(ScheduledEventKind::FireBeamShipShip, side)
                        .with_a(beam_slot)
                        .with_b(ANIMATION_ID),
                );
                if hit >= 0 {
                    self.render_hit(side.flip(), effect);
                }
            } else {
                self.pre.push(
                    ScheduledEvent::new(ScheduledEventKind::FireBeamShipFighter, side)
                        .with_a(target)
                        .with_b(beam_slot)
                        .with_c(ANIMATION_ID),
                );
            }
        } else if target < 0 {
            self.pre.push(
                ScheduledEvent::new(ScheduledEventKind::FireBeamFighterShip, side)
                    .with_a(track)
                    .with_b(ANIMATION_ID),
            );
            if hit >= 0 {
                self.render_hit(side.flip(), effect);
            }
        } else {
            self.pre.push(
                ScheduledEvent::new(ScheduledEventKind::FireBeamFighterFighter, side)
                    .with_a(track)
                    .with_b(target)
                    .with_c(ANIMATION_ID),
            );
        }
    }

    fn fire_torpedo(&mut self, side: Side, hit: i32, launcher: i32, torpedo_count_delta: i32, effect: HitEffect) {
        self.pre.push(
            ScheduledEvent::new(ScheduledEventKind::FireTorpedo, side)
                .with_a(launcher)
                .with_b(hit)
                .with_c(ANIMATION_ID)
                .with_d(6),
        );
        self.pre
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateNumTorpedoes, side).with_a(torpedo_count_delta));
        self.render_hit(side.flip(), effect);
    }

    fn update_beam(&mut self, side: Side, slot: i32, value: i32) {
        self.post
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateBeam, side).with_a(slot).with_b(value));
    }

    fn update_launcher(&mut self, side: Side, slot: i32, value: i32) {
        self.post
            .push(ScheduledEvent::new(ScheduledEventKind::UpdateLauncher, side).with_a(slot).with_b(value));
    }

    fn move_object(&mut self, side: Side, position: i32) {
        self.pre
            .push(ScheduledEvent::new(ScheduledEventKind::MoveObject, side).with_a(position));
    }

    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.pre.push(
            ScheduledEvent::new(ScheduledEventKind::MoveFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance)
                .with_d(status as i32),
        );
    }

    fn update_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32) {
        self.pre.push(
            ScheduledEvent::new(ScheduledEventKind::UpdateObject, side)
                .with_a(damage)
                .with_b(crew)
                .with_c(shield),
        );
    }

    fn update_ammo(&mut self, side: Side, num_torpedoes: i32, num_fighters: i32) {
        self.pre.push(
            ScheduledEvent::new(ScheduledEventKind::UpdateAmmo, side)
                .with_a(num_torpedoes)
                .with_b(num_fighters),
        );
    }

    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.pre.push(
            ScheduledEvent::new(ScheduledEventKind::UpdateFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance)
                .with_d(status as i32),
        );
    }

    fn set_result(&mut self, result: BattleResult) {
        self.post
            .push(ScheduledEvent::new(ScheduledEventKind::SetResult, Side::Left).with_a(result.to_integer()));
    }

    fn remove_animations(&mut self) {
        self.consumer.remove_animations(ANIMATION_ID, ANIMATION_ID);
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
    }

    impl ScheduledEventConsumer for Rc<RefCell<RecordingConsumer>> {
        fn place_object(&mut self, _side: Side, _info: UnitInfo) {}

        fn push_event(&mut self, event: ScheduledEvent) {
            self.borrow_mut().events.push(event);
        }

        fn remove_animations(&mut self, _from_id: i32, _to_id: i32) {}
    }

    #[test]
    fn pre_and_post_each_flush_with_their_own_wait_before_the_tick_trio() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = StandardScheduler::new(consumer.clone());

        scheduler.move_object(Side::Left, 100);
        scheduler.kill_fighter(Side::Left, 2);
        scheduler.update_time(5, 1000);

        let kinds: Vec<_> = consumer.borrow().events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ScheduledEventKind::MoveObject,
                ScheduledEventKind::WaitAnimation,
                ScheduledEventKind::ExplodeFighter,
                ScheduledEventKind::RemoveFighter,
                ScheduledEventKind::WaitAnimation,
                ScheduledEventKind::UpdateTime,
                ScheduledEventKind::UpdateDistance,
                ScheduledEventKind::WaitTick,
            ]
        );
    }

    #[test]
    fn empty_pre_or_post_group_emits_no_wait() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = StandardScheduler::new(consumer.clone());

        scheduler.update_time(1, 0);

        let kinds: Vec<_> = consumer.borrow().events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ScheduledEventKind::UpdateTime,
                ScheduledEventKind::UpdateDistance,
                ScheduledEventKind::WaitTick,
            ]
        );
    }

    #[test]
    fn kill_fighter_does_not_wait_individually_unlike_the_strictly_sequential_scheduler() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = StandardScheduler::new(consumer.clone());
        scheduler.kill_fighter(Side::Left, 0);

        // Nothing is flushed to the consumer until update_time runs.
        assert!(consumer.borrow().events.is_empty());
    }
}
