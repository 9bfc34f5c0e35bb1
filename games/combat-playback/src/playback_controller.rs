//! Drives classic combat visualization: a `ScheduledEventConsumer` that
//! queues incoming events and replays them against an animation engine under
//! a nine-state buffering/jumping state machine.
//!
//! The renderer, per-side status widgets, and the producer/network link are
//! all collaborators out of scope here (see the crate-level docs); they are
//! represented as traits (`AnimationEngine`, `UnitStatusWidget`,
//! `EventRequester`) so this module can be exercised and tested standalone.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use instruction_protocol::{
    BattleResult, EventListener, InstructionList, ScheduledEvent, ScheduledEventConsumer, ScheduledEventKind, Side,
    UnitInfo,
};

use crate::config::PlaybackConfig;
use crate::recorder::EventRecorder;

/// Which per-unit weapon bank a status update concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    Beam,
    Launcher,
}

/// The producer / network link collaborator: requests more events, or a jump
/// to a new time, from whatever is supplying the battle.
pub trait EventRequester {
    fn request_events(&mut self, from_index: u32);
    fn request_jump(&mut self, target_time: i32);
}

/// The renderer collaborator: everything that has a visible, time-based
/// effect on screen, plus the animation-liveness check `executeEvents` blocks
/// on.
#[allow(clippy::too_many_arguments)]
pub trait AnimationEngine {
    /// Whether the renderer has finished enough setup to start consuming
    /// events; while false, reception of the very first event batch is held
    /// rather than acted on.
    fn is_ready(&self) -> bool;

    fn place_object(&mut self, side: Side, info: &UnitInfo);
    fn move_object(&mut self, side: Side, position: i32);
    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32);
    fn remove_fighter(&mut self, side: Side, track: i32);
    fn fire_beam_ship_fighter(&mut self, side: Side, target: i32, beam_slot: i32, animation_id: i32);
    fn fire_beam_ship_ship(&mut self, side: Side, beam_slot: i32, animation_id: i32);
    fn fire_beam_fighter_fighter(&mut self, side: Side, track: i32, target: i32, animation_id: i32);
    fn fire_beam_fighter_ship(&mut self, side: Side, track: i32, animation_id: i32);
    fn fire_torpedo(&mut self, side: Side, launcher: i32, hit: i32, animation_id: i32, wait_ticks: i32);
    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: i32);
    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: i32);
    fn explode_fighter(&mut self, side: Side, track: i32, animation_id: i32);
    fn hit_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32, animation_id: i32);
    fn update_time(&mut self, time: i32);
    fn update_distance(&mut self, distance: i32);
    fn set_result(&mut self, result: BattleResult);
    fn set_result_visible(&mut self, visible: bool);
    /// Whether the animation issued under `id` is still playing.
    fn has_animation(&self, id: i32) -> bool;
    fn remove_animations(&mut self, id: i32);
    /// Advances one display frame; called whenever `execute_events` stops
    /// having made progress worth showing.
    fn tick(&mut self);
}

/// The per-side status panel collaborator.
pub trait UnitStatusWidget {
    fn set_identity(&mut self, name: &str, owner_name: &str, beam_name: &str, launcher_name: &str, is_planet: bool);
    fn set_levels(&mut self, shield: i32, damage: i32, crew: i32, num_torpedoes: i32, num_fighters: i32);
    fn set_damage(&mut self, value: i32);
    fn set_crew(&mut self, value: i32);
    fn set_shield(&mut self, value: i32);
    fn set_num_torpedoes(&mut self, value: i32);
    fn set_num_fighters(&mut self, value: i32);
    fn add_damage(&mut self, delta: i32);
    fn add_crew(&mut self, delta: i32);
    fn add_shield(&mut self, delta: i32);
    fn add_num_fighters(&mut self, delta: i32);
    fn add_num_torpedoes(&mut self, delta: i32);
    fn set_weapon_blocked(&mut self, weapon: WeaponKind, slot: i32, blocked: bool);
    fn set_weapon_level(&mut self, weapon: WeaponKind, slot: i32, value: i32);
    fn unblock_all_weapons(&mut self);
}

/// A batch of recorded `EventListener` calls as received from the producer,
/// not yet replayed against the controller's scheduler.
pub struct EventBundle(InstructionList);

impl EventBundle {
    pub fn new(list: InstructionList) -> Self {
        Self(list)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Initializing,
    Jumping,
    BeforeJumping,
    Forwarding,
    Red,
    Yellow,
    Green,
    Draining,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Paused,
    Playing,
}

struct Inner<A, U, R> {
    events: VecDeque<ScheduledEvent>,
    queued_time: i32,
    current_time: i32,
    ticks: u32,
    state: PlaybackState,
    play_state: PlayState,
    target_time: i32,
    config: PlaybackConfig,
    animation: A,
    left_status: U,
    right_status: U,
    requester: R,
}

impl<A, U, R> Inner<A, U, R> {
    fn status_mut(&mut self, side: Side) -> &mut U {
        match side {
            Side::Left => &mut self.left_status,
            Side::Right => &mut self.right_status,
        }
    }
}

/// The `ScheduledEventConsumer` handle a scheduler is constructed with; a
/// thin, cloneable reference into the controller's shared state. Schedulers
/// never see the controller directly, only this.
pub struct ConsumerHandle<A, U, R>(Rc<RefCell<Inner<A, U, R>>>);

impl<A, U, R> Clone for ConsumerHandle<A, U, R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A, U, R> ScheduledEventConsumer for ConsumerHandle<A, U, R>
where
    A: AnimationEngine,
    U: UnitStatusWidget,
{
    fn place_object(&mut self, side: Side, info: UnitInfo) {
        let mut inner = self.0.borrow_mut();
        inner.animation.place_object(side, &info);
        let shield = info.shield;
        let damage = info.damage;
        let crew = info.crew;
        let num_torpedoes = info.num_torpedoes;
        let num_fighters = info.num_fighters;
        let status = inner.status_mut(side);
        status.set_identity(&info.name, &info.owner_name, &info.beam_name, &info.launcher_name, info.is_planet);
        status.set_levels(shield, damage, crew, num_torpedoes, num_fighters);
    }

    fn push_event(&mut self, event: ScheduledEvent) {
        let mut inner = self.0.borrow_mut();
        if event.kind == ScheduledEventKind::UpdateTime {
            inner.queued_time = event.a;
        }
        inner.events.push_back(event);
    }

    fn remove_animations(&mut self, from_id: i32, to_id: i32) {
        let mut inner = self.0.borrow_mut();
        for id in from_id..=to_id {
            inner.animation.remove_animations(id);
        }
    }
}

/// Drives one battle's visualization: buffers incoming scheduled events,
/// plays them out against an animation engine at a steady tick rate, and
/// handles jumping to an arbitrary time.
pub struct PlaybackController<S, A, U, R> {
    inner: Rc<RefCell<Inner<A, U, R>>>,
    scheduler: S,
}

impl<S, A, U, R> PlaybackController<S, A, U, R>
where
    S: EventListener,
    A: AnimationEngine,
    U: UnitStatusWidget,
    R: EventRequester,
{
    pub fn new(
        make_scheduler: impl FnOnce(ConsumerHandle<A, U, R>) -> S,
        animation: A,
        left_status: U,
        right_status: U,
        requester: R,
        config: PlaybackConfig,
    ) -> Self {
        let inner = Rc::new(RefCell::new(Inner {
            events: VecDeque::new(),
            queued_time: 0,
            current_time: 0,
            ticks: 0,
            state: PlaybackState::Initializing,
            play_state: PlayState::Playing,
            target_time: 0,
            config,
            animation,
            left_status,
            right_status,
            requester,
        }));
        let scheduler = make_scheduler(ConsumerHandle(inner.clone()));
        Self { inner, scheduler }
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.borrow().state
    }

    pub fn play_state(&self) -> PlayState {
        self.inner.borrow().play_state
    }

    pub fn current_time(&self) -> i32 {
        self.inner.borrow().current_time
    }

    pub fn queued_time(&self) -> i32 {
        self.inner.borrow().queued_time
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let mut inner = self.inner.borrow_mut();
        tracing::debug!(from = ?inner.state, to = ?new_state, "playback state transition");
        inner.state = new_state;
    }

    /// Replays a freshly-arrived batch of recorded events through the
    /// scheduler (queuing whatever it decides to schedule) and advances the
    /// buffering state machine.
    pub fn on_events_received(&mut self, bundle: EventBundle, finished: bool) {
        let mut recorder = EventRecorder::new();
        let mut list = bundle.0;
        recorder.swap_content(&mut list);
        recorder.replay(&mut self.scheduler);

        match self.state() {
            PlaybackState::Initializing => {
                if self.inner.borrow().animation.is_ready() {
                    self.handle_event_reception_red(finished);
                } else if finished {
                    self.set_state(PlaybackState::Draining);
                }
            }
            PlaybackState::Jumping | PlaybackState::Forwarding => {
                self.scheduler.remove_animations();
                self.handle_event_reception_forwarding(finished);
            }
            PlaybackState::BeforeJumping => {
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.events.clear();
                    inner.current_time = -1;
                    inner.queued_time = 0;
                }
                self.set_state(PlaybackState::Jumping);
            }
            PlaybackState::Red => self.handle_event_reception_red(finished),
            PlaybackState::Yellow | PlaybackState::Green | PlaybackState::Finished | PlaybackState::Draining => {
                self.handle_event_reception_yellow_green(finished);
            }
        }
    }

    fn handle_event_reception_red(&mut self, finished: bool) {
        let (events_empty, queued_time, current_time, buffer_time) = {
            let inner = self.inner.borrow();
            (inner.events.is_empty(), inner.queued_time, inner.current_time, inner.config.buffer_time as i32)
        };

        let play = if events_empty || queued_time < current_time + buffer_time {
            if finished {
                self.set_state(PlaybackState::Draining);
                true
            } else {
                self.inner.borrow_mut().requester.request_events(queued_time.max(0) as u32);
                self.set_state(PlaybackState::Red);
                false
            }
        } else {
            self.set_state(PlaybackState::Green);
            true
        };

        if play && self.execute_events(i32::MAX) {
            self.inner.borrow_mut().animation.tick();
        }
    }

    fn handle_event_reception_yellow_green(&mut self, finished: bool) {
        let (queued_time, current_time, buffer_time) = {
            let inner = self.inner.borrow();
            (inner.queued_time, inner.current_time, inner.config.buffer_time as i32)
        };

        if queued_time < current_time + buffer_time {
            if finished {
                self.set_state(PlaybackState::Draining);
            } else {
                self.inner.borrow_mut().requester.request_events(queued_time.max(0) as u32);
                self.set_state(PlaybackState::Yellow);
            }
        } else {
            self.set_state(PlaybackState::Green);
        }
    }

    fn handle_event_reception_forwarding(&mut self, finished: bool) {
        self.set_state(PlaybackState::Forwarding);

        let target_time = self.inner.borrow().target_time;
        loop {
            if self.inner.borrow().current_time >= target_time {
                break;
            }
            if !self.execute_events(target_time) {
                break;
            }
            let mut inner = self.inner.borrow_mut();
            inner.animation.tick();
            inner.ticks += 1;
        }

        let (current_time, queued_time, buffer_time) = {
            let inner = self.inner.borrow();
            (inner.current_time, inner.queued_time, inner.config.buffer_time as i32)
        };

        let play = if finished {
            self.set_state(PlaybackState::Draining);
            true
        } else if current_time >= target_time {
            if queued_time < current_time + buffer_time {
                self.inner.borrow_mut().requester.request_events(queued_time.max(0) as u32);
                self.set_state(PlaybackState::Yellow);
            } else {
                self.set_state(PlaybackState::Green);
            }
            true
        } else {
            self.inner.borrow_mut().requester.request_events(queued_time.max(0) as u32);
            false
        };

        if play {
            self.inner.borrow_mut().animation.tick();
        }
    }

    /// Starts (or resumes) playback, executing an immediate tick when
    /// resuming into a state that has buffered events ready to show.
    pub fn play(&mut self) {
        let should_resume = {
            let inner = self.inner.borrow();
            inner.play_state == PlayState::Paused && inner.state != PlaybackState::Finished
        };
        if !should_resume {
            return;
        }
        self.inner.borrow_mut().play_state = PlayState::Playing;
        if matches!(self.state(), PlaybackState::Yellow | PlaybackState::Green | PlaybackState::Draining) {
            self.on_tick();
        }
    }

    pub fn pause(&mut self) {
        self.inner.borrow_mut().play_state = PlayState::Paused;
    }

    /// Periodic display-timer callback; ignored outside Yellow/Green/Draining.
    pub fn on_tick(&mut self) {
        if self.play_state() != PlayState::Playing {
            return;
        }

        match self.state() {
            PlaybackState::Initializing
            | PlaybackState::Red
            | PlaybackState::Jumping
            | PlaybackState::BeforeJumping
            | PlaybackState::Forwarding => {}

            PlaybackState::Yellow => {
                self.inner.borrow_mut().ticks += 1;
                if self.execute_events(i32::MAX) {
                    self.inner.borrow_mut().animation.tick();
                }
                if self.inner.borrow().events.is_empty() {
                    self.set_state(PlaybackState::Red);
                }
            }

            PlaybackState::Green => {
                self.inner.borrow_mut().ticks += 1;
                if self.execute_events(i32::MAX) {
                    self.inner.borrow_mut().animation.tick();
                }
                if self.inner.borrow().events.is_empty() {
                    self.inner.borrow_mut().requester.request_events(0);
                    self.set_state(PlaybackState::Red);
                } else {
                    let (queued_time, current_time, buffer_time) = {
                        let inner = self.inner.borrow();
                        (inner.queued_time, inner.current_time, inner.config.buffer_time as i32)
                    };
                    if queued_time < current_time + buffer_time {
                        self.inner.borrow_mut().requester.request_events(queued_time.max(0) as u32);
                        self.set_state(PlaybackState::Yellow);
                    }
                }
            }

            PlaybackState::Draining => {
                self.inner.borrow_mut().ticks += 1;
                if self.execute_events(i32::MAX) {
                    self.inner.borrow_mut().animation.tick();
                }
                if self.inner.borrow().events.is_empty() {
                    let mut inner = self.inner.borrow_mut();
                    inner.animation.set_result_visible(true);
                    inner.animation.tick();
                    drop(inner);
                    self.set_state(PlaybackState::Finished);
                }
            }

            PlaybackState::Finished => {}
        }
    }

    /// Requests a jump to `target_time`, ignored while already mid-jump or
    /// mid-forward.
    pub fn jump_to(&mut self, target_time: i32) {
        match self.state() {
            PlaybackState::Initializing | PlaybackState::Jumping | PlaybackState::BeforeJumping | PlaybackState::Forwarding => {}

            PlaybackState::Red | PlaybackState::Yellow => {
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.play_state = PlayState::Paused;
                    inner.target_time = target_time;
                }
                self.set_state(PlaybackState::BeforeJumping);
                self.inner.borrow_mut().requester.request_jump((target_time - 10).max(0));
            }

            PlaybackState::Green | PlaybackState::Draining | PlaybackState::Finished => {
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.animation.set_result_visible(false);
                    inner.play_state = PlayState::Paused;
                    inner.target_time = target_time;
                    inner.events.clear();
                    inner.current_time = -1;
                    inner.queued_time = 0;
                }
                self.set_state(PlaybackState::Jumping);
                self.inner.borrow_mut().requester.request_jump((target_time - 10).max(0));
            }
        }
    }

    /// Drains the queue, dispatching each event to the animation engine and
    /// status widgets, until either the queue empties (returns `false`, the
    /// caller should not repaint an incomplete frame) or a `WaitTick`/
    /// `WaitAnimation` blocks further progress (returns `true`).
    fn execute_events(&mut self, time_limit: i32) -> bool {
        loop {
            let event = match self.inner.borrow().events.front().copied() {
                Some(event) => event,
                None => return false,
            };

            if self.apply_event(event, time_limit) {
                return true;
            }
            self.inner.borrow_mut().events.pop_front();
        }
    }

    fn apply_event(&mut self, event: ScheduledEvent, time_limit: i32) -> bool {
        let mut inner = self.inner.borrow_mut();
        let side = event.side;
        match event.kind {
            ScheduledEventKind::UpdateTime => {
                inner.current_time = event.a;
                inner.animation.update_time(event.a);
                false
            }
            ScheduledEventKind::UpdateDistance => {
                inner.animation.update_distance(event.a);
                false
            }
            ScheduledEventKind::MoveObject => {
                inner.animation.move_object(side, event.a);
                false
            }
            ScheduledEventKind::StartFighter => {
                inner.animation.start_fighter(side, event.a, event.b, event.c);
                false
            }
            ScheduledEventKind::RemoveFighter => {
                inner.animation.remove_fighter(side, event.a);
                false
            }
            ScheduledEventKind::UpdateNumFighters => {
                inner.status_mut(side).add_num_fighters(event.a);
                false
            }
            ScheduledEventKind::FireBeamShipFighter => {
                inner.animation.fire_beam_ship_fighter(side, event.a, event.b, event.c);
                false
            }
            ScheduledEventKind::FireBeamShipShip => {
                inner.animation.fire_beam_ship_ship(side, event.a, event.b);
                false
            }
            ScheduledEventKind::FireBeamFighterShip => {
                inner.animation.fire_beam_fighter_ship(side, event.a, event.b);
                false
            }
            ScheduledEventKind::FireBeamFighterFighter => {
                inner.animation.fire_beam_fighter_fighter(side, event.a, event.b, event.c);
                false
            }
            ScheduledEventKind::BlockBeam => {
                inner.status_mut(side).set_weapon_blocked(WeaponKind::Beam, event.a, true);
                false
            }
            ScheduledEventKind::UnblockBeam => {
                inner.status_mut(side).set_weapon_blocked(WeaponKind::Beam, event.a, false);
                false
            }
            ScheduledEventKind::UpdateBeam => {
                inner.status_mut(side).set_weapon_level(WeaponKind::Beam, event.a, event.b);
                false
            }
            ScheduledEventKind::FireTorpedo => {
                inner.animation.fire_torpedo(side, event.a, event.b, event.c, event.d);
                false
            }
            ScheduledEventKind::UpdateNumTorpedoes => {
                inner.status_mut(side).add_num_torpedoes(event.a);
                false
            }
            ScheduledEventKind::BlockLauncher => {
                inner.status_mut(side).set_weapon_blocked(WeaponKind::Launcher, event.a, true);
                false
            }
            ScheduledEventKind::UnblockLauncher => {
                inner.status_mut(side).set_weapon_blocked(WeaponKind::Launcher, event.a, false);
                false
            }
            ScheduledEventKind::UpdateLauncher => {
                inner.status_mut(side).set_weapon_level(WeaponKind::Launcher, event.a, event.b);
                false
            }
            ScheduledEventKind::UpdateObject => {
                inner.status_mut(side).set_damage(event.a);
                inner.status_mut(side).set_crew(event.b);
                inner.status_mut(side).set_shield(event.c);
                inner.status_mut(side).unblock_all_weapons();
                false
            }
            ScheduledEventKind::UpdateAmmo => {
                inner.status_mut(side).set_num_torpedoes(event.a);
                inner.status_mut(side).set_num_fighters(event.b);
                false
            }
            ScheduledEventKind::HitObject => {
                inner.animation.hit_object(side, event.a, event.b, event.c, event.d);
                inner.status_mut(side).add_damage(event.a);
                inner.status_mut(side).add_crew(-event.b);
                inner.status_mut(side).add_shield(-event.c);
                false
            }
            ScheduledEventKind::MoveFighter => {
                inner.animation.move_fighter(side, event.a, event.b, event.c, event.d);
                false
            }
            ScheduledEventKind::UpdateFighter => {
                inner.animation.update_fighter(side, event.a, event.b, event.c, event.d);
                false
            }
            ScheduledEventKind::ExplodeFighter => {
                inner.animation.explode_fighter(side, event.a, event.b);
                false
            }
            ScheduledEventKind::SetResult => {
                inner.animation.set_result(BattleResult::from_integer(event.a));
                false
            }
            ScheduledEventKind::WaitTick => {
                if inner.ticks < inner.config.ticks_per_battle_cycle {
                    return true;
                }
                inner.ticks = 0;
                inner.current_time >= time_limit
            }
            ScheduledEventKind::WaitAnimation => inner.animation.has_animation(event.a),
        }
    }
}
