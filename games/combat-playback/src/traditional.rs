//! Converts incoming [`EventListener`] calls straight into
//! [`ScheduledEventConsumer`] events, in exactly the order they arrive. This
//! is the "no scheduling at all" scheduler: events happen strictly in
//! sequence, in the same order the combat algorithm itself produced them.

use instruction_protocol::{
    BattleResult, EventListener, FighterStatus, HitEffect, ScheduledEvent, ScheduledEventConsumer,
    ScheduledEventKind, Side, UnitInfo,
};

/// All animations this scheduler creates use this id and are immediately
/// waited upon, so there is never more than one animation in flight.
const ANIMATION_ID: i32 = 99;

/// Renders every combat event immediately, in arrival order.
pub struct TraditionalScheduler<C> {
    consumer: C,
}

impl<C> TraditionalScheduler<C>
where
    C: ScheduledEventConsumer,
{
    pub fn new(consumer: C) -> Self {
        Self { consumer }
    }

    pub fn into_inner(self) -> C {
        self.consumer
    }

    fn render_hit(&mut self, side: Side, effect: HitEffect) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::HitObject, side)
                .with_a(effect.damage_done)
                .with_b(effect.crew_killed)
                .with_c(effect.shield_lost)
                .with_d(ANIMATION_ID),
        );
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
    }
}

impl<C> EventListener for TraditionalScheduler<C>
where
    C: ScheduledEventConsumer,
{
    fn place_object(&mut self, side: Side, info: UnitInfo) {
        self.consumer.place_object(side, info);
    }

    fn update_time(&mut self, time: i32, distance: i32) {
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::UpdateTime, Side::Left).with_a(time));
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::UpdateDistance, Side::Left).with_a(distance));
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::WaitTick, Side::Left));
    }

    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, fighter_count_delta: i32) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::StartFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance),
        );
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateNumFighters, side).with_a(fighter_count_delta),
        );
    }

    fn land_fighter(&mut self, side: Side, track: i32, fighter_count_delta: i32) {
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::RemoveFighter, side).with_a(track));
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateNumFighters, side).with_a(fighter_count_delta),
        );
    }

    fn kill_fighter(&mut self, side: Side, track: i32) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::ExplodeFighter, side)
                .with_a(track)
                .with_b(ANIMATION_ID),
        );
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::RemoveFighter, side).with_a(track));
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
    }

    fn fire_beam(&mut self, side: Side, track: i32, target: i32, hit: i32, _damage: i32, _kill: i32, effect: HitEffect) {
        if track < 0 {
            let beam_slot = -1 - track;
            if target < 0 {
                self.consumer.push_event(
                    ScheduledEvent::new(ScheduledEventKind::FireBeamShipShip, side)
                        .with_a(beam_slot)
                        .with_b(ANIMATION_ID),
                );
                self.consumer
                    .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
                if hit >= 0 {
                    self.render_hit(side.flip(), effect);
                }
            } else {
                self.consumer.push_event(
                    ScheduledEvent::new(ScheduledEventKind::FireBeamShipFighter, side)
                        .with_a(target)
                        .with_b(beam_slot)
                        .with_c(ANIMATION_ID),
                );
                self.consumer
                    .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
            }
        } else if target < 0 {
            self.consumer.push_event(
                ScheduledEvent::new(ScheduledEventKind::FireBeamFighterShip, side)
                    .with_a(track)
                    .with_b(ANIMATION_ID),
            );
            self.consumer
                .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
            if hit >= 0 {
                self.render_hit(side.flip(), effect);
            }
        } else {
            self.consumer.push_event(
                ScheduledEvent::new(ScheduledEventKind::FireBeamFighterFighter, side)
                    .with_a(track)
                    .with_b(target)
                    .with_c(ANIMATION_ID),
            );
            self.consumer
                .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
        }
    }

    fn fire_torpedo(&mut self, side: Side, hit: i32, launcher: i32, torpedo_count_delta: i32, effect: HitEffect) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::FireTorpedo, side)
                .with_a(launcher)
                .with_b(hit)
                .with_c(ANIMATION_ID)
                .with_d(6),
        );
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateNumTorpedoes, side).with_a(torpedo_count_delta),
        );
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::WaitAnimation, side).with_a(ANIMATION_ID));
        self.render_hit(side.flip(), effect);
    }

    fn update_beam(&mut self, side: Side, slot: i32, value: i32) {
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::UpdateBeam, side).with_a(slot).with_b(value));
    }

    fn update_launcher(&mut self, side: Side, slot: i32, value: i32) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateLauncher, side)
                .with_a(slot)
                .with_b(value),
        );
    }

    fn move_object(&mut self, side: Side, position: i32) {
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::MoveObject, side).with_a(position));
    }

    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::MoveFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance)
                .with_d(status as i32),
        );
    }

    fn update_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateObject, side)
                .with_a(damage)
                .with_b(crew)
                .with_c(shield),
        );
    }

    fn update_ammo(&mut self, side: Side, num_torpedoes: i32, num_fighters: i32) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateAmmo, side)
                .with_a(num_torpedoes)
                .with_b(num_fighters),
        );
    }

    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.consumer.push_event(
            ScheduledEvent::new(ScheduledEventKind::UpdateFighter, side)
                .with_a(track)
                .with_b(position)
                .with_c(distance)
                .with_d(status as i32),
        );
    }

    fn set_result(&mut self, result: BattleResult) {
        self.consumer
            .push_event(ScheduledEvent::new(ScheduledEventKind::SetResult, Side::Left).with_a(result.to_integer()));
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
        placed: Vec<(Side, UnitInfo)>,
        events: Vec<ScheduledEvent>,
        removed: Vec<(i32, i32)>,
    }

    impl ScheduledEventConsumer for Rc<RefCell<RecordingConsumer>> {
        fn place_object(&mut self, side: Side, info: UnitInfo) {
            self.borrow_mut().placed.push((side, info));
        }

        fn push_event(&mut self, event: ScheduledEvent) {
            self.borrow_mut().events.push(event);
        }

        fn remove_animations(&mut self, from_id: i32, to_id: i32) {
            self.borrow_mut().removed.push((from_id, to_id));
        }
    }

    fn sample_unit() -> UnitInfo {
        UnitInfo {
            id: 1,
            owner: 1,
            mass: 100,
            is_planet: false,
            picture: 1,
            beam_type: 1,
            num_beams: 4,
            torpedo_type: 0,
            num_launchers: 0,
            num_bays: 0,
            damage: 0,
            shield: 100,
            crew: 200,
            num_torpedoes: 0,
            num_fighters: 0,
            position: 0,
            owner_relation: 0,
            name: "Fearless".into(),
            owner_name: "Federation".into(),
            beam_name: "Laser".into(),
            launcher_name: String::new(),
        }
    }

    #[test]
    fn update_time_emits_time_distance_and_wait_tick_in_order() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = TraditionalScheduler::new(consumer.clone());
        scheduler.update_time(10, 5000);

        let events = &consumer.borrow().events;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, ScheduledEventKind::UpdateTime);
        assert_eq!(events[0].a, 10);
        assert_eq!(events[1].kind, ScheduledEventKind::UpdateDistance);
        assert_eq!(events[1].a, 5000);
        assert_eq!(events[2].kind, ScheduledEventKind::WaitTick);
    }

    #[test]
    fn kill_fighter_explodes_removes_then_waits() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = TraditionalScheduler::new(consumer.clone());
        scheduler.kill_fighter(Side::Left, 3);

        let events = &consumer.borrow().events;
        assert_eq!(
            events.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![
                ScheduledEventKind::ExplodeFighter,
                ScheduledEventKind::RemoveFighter,
                ScheduledEventKind::WaitAnimation,
            ]
        );
        assert!(events.iter().all(|e| e.kind != ScheduledEventKind::ExplodeFighter || e.b == ANIMATION_ID));
    }

    #[test]
    fn ship_to_ship_beam_hit_renders_the_effect_on_the_flipped_side() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = TraditionalScheduler::new(consumer.clone());
        let effect = HitEffect {
            damage_done: 5,
            crew_killed: 1,
            shield_lost: 10,
        };
        // track < 0 encodes a beam slot; target < 0 means the opposing unit.
        scheduler.fire_beam(Side::Left, -1, -1, 1, 5, 0, effect);

        let events = consumer.borrow().events.clone();
        assert_eq!(events[0].kind, ScheduledEventKind::FireBeamShipShip);
        assert_eq!(events[0].side, Side::Left);
        let hit = events.iter().find(|e| e.kind == ScheduledEventKind::HitObject).unwrap();
        assert_eq!(hit.side, Side::Right);
        assert_eq!(hit.a, 5);
    }

    #[test]
    fn remove_animations_targets_the_single_shared_animation_id() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = TraditionalScheduler::new(consumer.clone());
        scheduler.remove_animations();
        assert_eq!(consumer.borrow().removed, vec![(ANIMATION_ID, ANIMATION_ID)]);
    }

    #[test]
    fn place_object_forwards_immediately() {
        let consumer = Rc::new(RefCell::new(RecordingConsumer::default()));
        let mut scheduler = TraditionalScheduler::new(consumer.clone());
        scheduler.place_object(Side::Left, sample_unit());
        assert_eq!(consumer.borrow().placed.len(), 1);
    }
}
