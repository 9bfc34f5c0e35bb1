//! End-to-end exercise of the playback core: a producer thread records a
//! short fixture battle, hands it across to the main thread, and a
//! `PlaybackController` buffers and plays it back against logging-only
//! stand-ins for the renderer, status panels, and network link.
//!
//! Those three collaborators (`AnimationEngine`, `UnitStatusWidget`,
//! `EventRequester`) have no real implementation in this workspace; what
//! follows is demo-only wiring to prove the core runs, not a reference
//! implementation of any of them.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use combat_playback::{
    AnimationEngine, EventBundle, EventRecorder, EventRequester, PlaybackConfig, PlaybackController, PlaybackState,
    TraditionalScheduler, UnitStatusWidget, WeaponKind,
};
use instruction_protocol::{
    BattleResult, BattleResultBit, EventListener, FighterStatus, HitEffect, InstructionList, Side, UnitInfo,
};
use request_runtime::{Dispatcher, Receiver, SameThreadDispatcher, ThreadDispatcher};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Default)]
struct LoggingAnimation {
    result_visible: bool,
}

impl AnimationEngine for LoggingAnimation {
    fn is_ready(&self) -> bool {
        true
    }

    fn place_object(&mut self, side: Side, info: &UnitInfo) {
        tracing::debug!(?side, name = %info.name, "place_object");
    }

    fn move_object(&mut self, side: Side, position: i32) {
        tracing::debug!(?side, position, "move_object");
    }

    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32) {
        tracing::debug!(?side, track, position, distance, "start_fighter");
    }

    fn remove_fighter(&mut self, side: Side, track: i32) {
        tracing::debug!(?side, track, "remove_fighter");
    }

    fn fire_beam_ship_fighter(&mut self, side: Side, target: i32, beam_slot: i32, animation_id: i32) {
        tracing::debug!(?side, target, beam_slot, animation_id, "fire_beam_ship_fighter");
    }

    fn fire_beam_ship_ship(&mut self, side: Side, beam_slot: i32, animation_id: i32) {
        tracing::debug!(?side, beam_slot, animation_id, "fire_beam_ship_ship");
    }

    fn fire_beam_fighter_fighter(&mut self, side: Side, track: i32, target: i32, animation_id: i32) {
        tracing::debug!(?side, track, target, animation_id, "fire_beam_fighter_fighter");
    }

    fn fire_beam_fighter_ship(&mut self, side: Side, track: i32, animation_id: i32) {
        tracing::debug!(?side, track, animation_id, "fire_beam_fighter_ship");
    }

    fn fire_torpedo(&mut self, side: Side, launcher: i32, hit: i32, animation_id: i32, wait_ticks: i32) {
        tracing::debug!(?side, launcher, hit, animation_id, wait_ticks, "fire_torpedo");
    }

    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: i32) {
        tracing::debug!(?side, track, position, distance, status, "move_fighter");
    }

    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: i32) {
        tracing::debug!(?side, track, position, distance, status, "update_fighter");
    }

    fn explode_fighter(&mut self, side: Side, track: i32, animation_id: i32) {
        tracing::debug!(?side, track, animation_id, "explode_fighter");
    }

    fn hit_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32, animation_id: i32) {
        tracing::debug!(?side, damage, crew, shield, animation_id, "hit_object");
    }

    fn update_time(&mut self, time: i32) {
        tracing::debug!(time, "update_time");
    }

    fn update_distance(&mut self, distance: i32) {
        tracing::debug!(distance, "update_distance");
    }

    fn set_result(&mut self, result: BattleResult) {
        tracing::info!(result = result.to_integer(), "set_result");
    }

    fn set_result_visible(&mut self, visible: bool) {
        tracing::info!(visible, "set_result_visible");
        self.result_visible = visible;
    }

    fn has_animation(&self, _id: i32) -> bool {
        false
    }

    fn remove_animations(&mut self, id: i32) {
        tracing::debug!(id, "remove_animations");
    }

    fn tick(&mut self) {
        tracing::debug!("tick");
    }
}

struct LoggingStatus {
    side_name: &'static str,
}

impl LoggingStatus {
    fn new(side_name: &'static str) -> Self {
        Self { side_name }
    }
}

impl UnitStatusWidget for LoggingStatus {
    fn set_identity(&mut self, name: &str, owner_name: &str, beam_name: &str, launcher_name: &str, is_planet: bool) {
        tracing::debug!(side = self.side_name, name, owner_name, beam_name, launcher_name, is_planet, "set_identity");
    }

    fn set_levels(&mut self, shield: i32, damage: i32, crew: i32, num_torpedoes: i32, num_fighters: i32) {
        tracing::debug!(side = self.side_name, shield, damage, crew, num_torpedoes, num_fighters, "set_levels");
    }

    fn set_damage(&mut self, value: i32) {
        tracing::debug!(side = self.side_name, value, "set_damage");
    }

    fn set_crew(&mut self, value: i32) {
        tracing::debug!(side = self.side_name, value, "set_crew");
    }

    fn set_shield(&mut self, value: i32) {
        tracing::debug!(side = self.side_name, value, "set_shield");
    }

    fn set_num_torpedoes(&mut self, value: i32) {
        tracing::debug!(side = self.side_name, value, "set_num_torpedoes");
    }

    fn set_num_fighters(&mut self, value: i32) {
        tracing::debug!(side = self.side_name, value, "set_num_fighters");
    }

    fn add_damage(&mut self, delta: i32) {
        tracing::debug!(side = self.side_name, delta, "add_damage");
    }

    fn add_crew(&mut self, delta: i32) {
        tracing::debug!(side = self.side_name, delta, "add_crew");
    }

    fn add_shield(&mut self, delta: i32) {
        tracing::debug!(side = self.side_name, delta, "add_shield");
    }

    fn add_num_fighters(&mut self, delta: i32) {
        tracing::debug!(side = self.side_name, delta, "add_num_fighters");
    }

    fn add_num_torpedoes(&mut self, delta: i32) {
        tracing::debug!(side = self.side_name, delta, "add_num_torpedoes");
    }

    fn set_weapon_blocked(&mut self, weapon: WeaponKind, slot: i32, blocked: bool) {
        tracing::debug!(side = self.side_name, ?weapon, slot, blocked, "set_weapon_blocked");
    }

    fn set_weapon_level(&mut self, weapon: WeaponKind, slot: i32, value: i32) {
        tracing::debug!(side = self.side_name, ?weapon, slot, value, "set_weapon_level");
    }

    fn unblock_all_weapons(&mut self) {
        tracing::debug!(side = self.side_name, "unblock_all_weapons");
    }
}

struct LoggingRequester;

impl EventRequester for LoggingRequester {
    fn request_events(&mut self, from_index: u32) {
        tracing::info!(from_index, "request_events (no producer attached; demo sends one batch up front)");
    }

    fn request_jump(&mut self, target_time: i32) {
        tracing::info!(target_time, "request_jump");
    }
}

fn sample_unit(side: Side, name: &str) -> UnitInfo {
    let owner = match side {
        Side::Left => "Terran Federation",
        Side::Right => "Rebel Confederation",
    };
    UnitInfo {
        id: match side {
            Side::Left => 1,
            Side::Right => 2,
        },
        owner: 0,
        mass: 900,
        is_planet: false,
        picture: 3,
        beam_type: 2,
        num_beams: 4,
        torpedo_type: 1,
        num_launchers: 2,
        num_bays: 1,
        damage: 0,
        shield: 100,
        crew: 400,
        num_torpedoes: 12,
        num_fighters: 4,
        position: 0,
        owner_relation: 0,
        name: name.to_string(),
        owner_name: owner.to_string(),
        beam_name: "Disruptor".to_string(),
        launcher_name: "Mk VII Tube".to_string(),
    }
}

/// Builds a short, entirely made-up battle and records it the way a real
/// combat algorithm would, one `EventListener` call at a time.
fn record_fixture_battle() -> InstructionList {
    let mut recorder = EventRecorder::new();

    recorder.place_object(Side::Left, sample_unit(Side::Left, "ISS Resolute"));
    recorder.place_object(Side::Right, sample_unit(Side::Right, "RCS Talon"));

    recorder.start_fighter(Side::Left, 0, 0, 500, 1);
    recorder.update_time(1, 500);

    recorder.move_fighter(Side::Left, 0, 100, 400, FighterStatus::Attacks);
    recorder.fire_beam(Side::Right, -1, 0, 1, 15, 0, HitEffect { damage_done: 15, crew_killed: 0, shield_lost: 15 });
    recorder.update_time(2, 400);

    recorder.fire_beam(Side::Left, 0, -1, 1, 0, 1, HitEffect { damage_done: 0, crew_killed: 2, shield_lost: 0 });
    recorder.kill_fighter(Side::Left, 0);
    recorder.update_time(3, 0);

    recorder.set_result(BattleResult::empty().with(BattleResultBit::RightDestroyed));

    let mut list = InstructionList::new();
    recorder.swap_content(&mut list);
    list
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let inbox: Receiver<VecDeque<(InstructionList, bool)>> = Receiver::new(VecDeque::new());
    let inbox_sender = inbox.sender(Arc::new(SameThreadDispatcher) as Arc<dyn Dispatcher>);

    let producer = ThreadDispatcher::spawn("combat-producer");
    producer.post_runnable(Box::new(move || {
        tracing::info!("producer: recording fixture battle");
        let list = record_fixture_battle();
        inbox_sender.post_fn(move |queue| queue.push_back((list, true)));
    }));

    let mut controller = PlaybackController::new(
        TraditionalScheduler::new,
        LoggingAnimation::default(),
        LoggingStatus::new("left"),
        LoggingStatus::new("right"),
        LoggingRequester,
        PlaybackConfig::default(),
    );

    // The producer above runs entirely before this loop ever observes it, so
    // one poll with a short backoff is enough to pick the recording up;
    // nothing here depends on the producer thread's exact scheduling.
    loop {
        let batch = inbox.with(|queue| queue.pop_front());
        match batch {
            Some((list, finished)) => {
                controller.on_events_received(EventBundle::new(list), finished);
                break;
            }
            None => std::thread::sleep(Duration::from_millis(5)),
        }
    }

    controller.play();
    let config = PlaybackConfig::default();
    while controller.state() != PlaybackState::Finished {
        std::thread::sleep(Duration::from_millis(config.tick_interval_ms as u64));
        controller.on_tick();
        tracing::info!(
            state = ?controller.state(),
            current_time = controller.current_time(),
            queued_time = controller.queued_time(),
            "tick"
        );
    }

    tracing::info!("playback finished");
    drop(producer);
}
