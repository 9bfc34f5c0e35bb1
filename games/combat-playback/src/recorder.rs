//! Records every [`EventListener`] call into an [`InstructionList`] and can
//! later replay that recording, call for call and in the same order, onto
//! any other `EventListener`. The wire format below is private to this
//! module; nothing outside it needs to know how a call is encoded.

use instruction_protocol::{
    BattleResult, EventListener, FighterStatus, HitEffect, InstructionList, Side, UnitInfo,
};

#[repr(i32)]
#[derive(Clone, Copy)]
enum Opcode {
    PlaceObject = 0,
    UpdateTime,
    StartFighter,
    LandFighter,
    KillFighter,
    FireBeam,
    FireTorpedo,
    UpdateBeam,
    UpdateLauncher,
    MoveObject,
    MoveFighter,
    KillObject,
    UpdateObject,
    UpdateAmmo,
    UpdateFighter,
    SetResult,
    RemoveAnimations,
}

fn side_to_param(side: Side) -> i32 {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

fn side_from_param(value: i32) -> Side {
    if value == 0 { Side::Left } else { Side::Right }
}

fn status_from_param(value: i32) -> FighterStatus {
    match value {
        0 => FighterStatus::Idle,
        1 => FighterStatus::Attacks,
        _ => FighterStatus::Returns,
    }
}

/// Captures a sequence of `EventListener` calls for later replay.
#[derive(Default)]
pub struct EventRecorder {
    content: InstructionList,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchanges this recording's content with `other` without copying it;
    /// used both to hand a finished recording off and to load one back in.
    pub fn swap_content(&mut self, other: &mut InstructionList) {
        self.content.swap(other);
    }

    /// Informative-only approximation of how much has been recorded; zero
    /// means nothing has been captured yet.
    pub fn size(&self) -> usize {
        self.content.size()
    }

    /// Calls every recorded `EventListener` method on `listener`, in the
    /// order it was originally recorded.
    pub fn replay(&self, listener: &mut dyn EventListener) {
        let mut reader = self.content.read();
        let mut opcode = 0;
        while reader.read_instruction(&mut opcode) {
            match opcode {
                x if x == Opcode::PlaceObject as i32 => {
                    let mut side = 0;
                    let mut id = 0;
                    let mut owner = 0;
                    let mut mass = 0;
                    let mut is_planet = 0;
                    let mut picture = 0;
                    let mut beam_type = 0;
                    let mut num_beams = 0;
                    let mut torpedo_type = 0;
                    let mut num_launchers = 0;
                    let mut num_bays = 0;
                    let mut damage = 0;
                    let mut shield = 0;
                    let mut crew = 0;
                    let mut num_torpedoes = 0;
                    let mut num_fighters = 0;
                    let mut position = 0;
                    let mut owner_relation = 0;
                    let mut name = String::new();
                    let mut owner_name = String::new();
                    let mut beam_name = String::new();
                    let mut launcher_name = String::new();
                    let ok = reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut id)
                        && reader.read_parameter(&mut owner)
                        && reader.read_parameter(&mut mass)
                        && reader.read_parameter(&mut is_planet)
                        && reader.read_parameter(&mut picture)
                        && reader.read_parameter(&mut beam_type)
                        && reader.read_parameter(&mut num_beams)
                        && reader.read_parameter(&mut torpedo_type)
                        && reader.read_parameter(&mut num_launchers)
                        && reader.read_parameter(&mut num_bays)
                        && reader.read_parameter(&mut damage)
                        && reader.read_parameter(&mut shield)
                        && reader.read_parameter(&mut crew)
                        && reader.read_parameter(&mut num_torpedoes)
                        && reader.read_parameter(&mut num_fighters)
                        && reader.read_parameter(&mut position)
                        && reader.read_parameter(&mut owner_relation)
                        && reader.read_string_parameter(&mut name)
                        && reader.read_string_parameter(&mut owner_name)
                        && reader.read_string_parameter(&mut beam_name)
                        && reader.read_string_parameter(&mut launcher_name);
                    if ok {
                        listener.place_object(
                            side_from_param(side),
                            UnitInfo {
                                id,
                                owner,
                                mass,
                                is_planet: is_planet != 0,
                                picture,
                                beam_type,
                                num_beams,
                                torpedo_type,
                                num_launchers,
                                num_bays,
                                damage,
                                shield,
                                crew,
                                num_torpedoes,
                                num_fighters,
                                position,
                                owner_relation,
                                name,
                                owner_name,
                                beam_name,
                                launcher_name,
                            },
                        );
                    }
                }
                x if x == Opcode::UpdateTime as i32 => {
                    let (mut time, mut distance) = (0, 0);
                    if reader.read_parameter(&mut time) && reader.read_parameter(&mut distance) {
                        listener.update_time(time, distance);
                    }
                }
                x if x == Opcode::StartFighter as i32 => {
                    let (mut side, mut track, mut position, mut distance, mut diff) = (0, 0, 0, 0, 0);
                    if reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut track)
                        && reader.read_parameter(&mut position)
                        && reader.read_parameter(&mut distance)
                        && reader.read_parameter(&mut diff)
                    {
                        listener.start_fighter(side_from_param(side), track, position, distance, diff);
                    }
                }
                x if x == Opcode::LandFighter as i32 => {
                    let (mut side, mut track, mut diff) = (0, 0, 0);
                    if reader.read_parameter(&mut side) && reader.read_parameter(&mut track) && reader.read_parameter(&mut diff) {
                        listener.land_fighter(side_from_param(side), track, diff);
                    }
                }
                x if x == Opcode::KillFighter as i32 => {
                    let (mut side, mut track) = (0, 0);
                    if reader.read_parameter(&mut side) && reader.read_parameter(&mut track) {
                        listener.kill_fighter(side_from_param(side), track);
                    }
                }
                x if x == Opcode::FireBeam as i32 => {
                    let (mut side, mut track, mut target, mut hit, mut damage, mut kill) = (0, 0, 0, 0, 0, 0);
                    let (mut damage_done, mut crew_killed, mut shield_lost) = (0, 0, 0);
                    let ok = reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut track)
                        && reader.read_parameter(&mut target)
                        && reader.read_parameter(&mut hit)
                        && reader.read_parameter(&mut damage)
                        && reader.read_parameter(&mut kill)
                        && reader.read_parameter(&mut damage_done)
                        && reader.read_parameter(&mut crew_killed)
                        && reader.read_parameter(&mut shield_lost);
                    if ok {
                        listener.fire_beam(
                            side_from_param(side),
                            track,
                            target,
                            hit,
                            damage,
                            kill,
                            HitEffect {
                                damage_done,
                                crew_killed,
                                shield_lost,
                            },
                        );
                    }
                }
                x if x == Opcode::FireTorpedo as i32 => {
                    let (mut side, mut hit, mut launcher, mut diff) = (0, 0, 0, 0);
                    let (mut damage_done, mut crew_killed, mut shield_lost) = (0, 0, 0);
                    let ok = reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut hit)
                        && reader.read_parameter(&mut launcher)
                        && reader.read_parameter(&mut diff)
                        && reader.read_parameter(&mut damage_done)
                        && reader.read_parameter(&mut crew_killed)
                        && reader.read_parameter(&mut shield_lost);
                    if ok {
                        listener.fire_torpedo(
                            side_from_param(side),
                            hit,
                            launcher,
                            diff,
                            HitEffect {
                                damage_done,
                                crew_killed,
                                shield_lost,
                            },
                        );
                    }
                }
                x if x == Opcode::UpdateBeam as i32 => {
                    let (mut side, mut id, mut value) = (0, 0, 0);
                    if reader.read_parameter(&mut side) && reader.read_parameter(&mut id) && reader.read_parameter(&mut value) {
                        listener.update_beam(side_from_param(side), id, value);
                    }
                }
                x if x == Opcode::UpdateLauncher as i32 => {
                    let (mut side, mut id, mut value) = (0, 0, 0);
                    if reader.read_parameter(&mut side) && reader.read_parameter(&mut id) && reader.read_parameter(&mut value) {
                        listener.update_launcher(side_from_param(side), id, value);
                    }
                }
                x if x == Opcode::MoveObject as i32 => {
                    let (mut side, mut position) = (0, 0);
                    if reader.read_parameter(&mut side) && reader.read_parameter(&mut position) {
                        listener.move_object(side_from_param(side), position);
                    }
                }
                x if x == Opcode::MoveFighter as i32 => {
                    let (mut side, mut track, mut position, mut distance, mut status) = (0, 0, 0, 0, 0);
                    let ok = reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut track)
                        && reader.read_parameter(&mut position)
                        && reader.read_parameter(&mut distance)
                        && reader.read_parameter(&mut status);
                    if ok {
                        listener.move_fighter(side_from_param(side), track, position, distance, status_from_param(status));
                    }
                }
                x if x == Opcode::KillObject as i32 => {
                    let mut side = 0;
                    if reader.read_parameter(&mut side) {
                        listener.kill_object(side_from_param(side));
                    }
                }
                x if x == Opcode::UpdateObject as i32 => {
                    let (mut side, mut damage, mut crew, mut shield) = (0, 0, 0, 0);
                    let ok = reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut damage)
                        && reader.read_parameter(&mut crew)
                        && reader.read_parameter(&mut shield);
                    if ok {
                        listener.update_object(side_from_param(side), damage, crew, shield);
                    }
                }
                x if x == Opcode::UpdateAmmo as i32 => {
                    let (mut side, mut torps, mut fighters) = (0, 0, 0);
                    if reader.read_parameter(&mut side) && reader.read_parameter(&mut torps) && reader.read_parameter(&mut fighters) {
                        listener.update_ammo(side_from_param(side), torps, fighters);
                    }
                }
                x if x == Opcode::UpdateFighter as i32 => {
                    let (mut side, mut track, mut position, mut distance, mut status) = (0, 0, 0, 0, 0);
                    let ok = reader.read_parameter(&mut side)
                        && reader.read_parameter(&mut track)
                        && reader.read_parameter(&mut position)
                        && reader.read_parameter(&mut distance)
                        && reader.read_parameter(&mut status);
                    if ok {
                        listener.update_fighter(side_from_param(side), track, position, distance, status_from_param(status));
                    }
                }
                x if x == Opcode::SetResult as i32 => {
                    let mut result = 0;
                    if reader.read_parameter(&mut result) {
                        listener.set_result(BattleResult::from_integer(result));
                    }
                }
                x if x == Opcode::RemoveAnimations as i32 => {
                    listener.remove_animations();
                }
                _ => {}
            }
        }
    }
}

impl EventListener for EventRecorder {
    fn place_object(&mut self, side: Side, info: UnitInfo) {
        self.content
            .add_instruction(Opcode::PlaceObject as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(info.id)
            .add_parameter(info.owner)
            .add_parameter(info.mass)
            .add_parameter(info.is_planet as i32)
            .add_parameter(info.picture)
            .add_parameter(info.beam_type)
            .add_parameter(info.num_beams)
            .add_parameter(info.torpedo_type)
            .add_parameter(info.num_launchers)
            .add_parameter(info.num_bays)
            .add_parameter(info.damage)
            .add_parameter(info.shield)
            .add_parameter(info.crew)
            .add_parameter(info.num_torpedoes)
            .add_parameter(info.num_fighters)
            .add_parameter(info.position)
            .add_parameter(info.owner_relation)
            .add_string_parameter(info.name)
            .expect("recording exceeded the representable string pool size")
            .add_string_parameter(info.owner_name)
            .expect("recording exceeded the representable string pool size")
            .add_string_parameter(info.beam_name)
            .expect("recording exceeded the representable string pool size")
            .add_string_parameter(info.launcher_name)
            .expect("recording exceeded the representable string pool size");
    }

    fn update_time(&mut self, time: i32, distance: i32) {
        self.content
            .add_instruction(Opcode::UpdateTime as i32)
            .add_parameter(time)
            .add_parameter(distance);
    }

    fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, fighter_count_delta: i32) {
        self.content
            .add_instruction(Opcode::StartFighter as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(track)
            .add_parameter(position)
            .add_parameter(distance)
            .add_parameter(fighter_count_delta);
    }

    fn land_fighter(&mut self, side: Side, track: i32, fighter_count_delta: i32) {
        self.content
            .add_instruction(Opcode::LandFighter as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(track)
            .add_parameter(fighter_count_delta);
    }

    fn kill_fighter(&mut self, side: Side, track: i32) {
        self.content
            .add_instruction(Opcode::KillFighter as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(track);
    }

    fn fire_beam(&mut self, side: Side, track: i32, target: i32, hit: i32, damage: i32, kill: i32, effect: HitEffect) {
        self.content
            .add_instruction(Opcode::FireBeam as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(track)
            .add_parameter(target)
            .add_parameter(hit)
            .add_parameter(damage)
            .add_parameter(kill)
            .add_parameter(effect.damage_done)
            .add_parameter(effect.crew_killed)
            .add_parameter(effect.shield_lost);
    }

    fn fire_torpedo(&mut self, side: Side, hit: i32, launcher: i32, torpedo_count_delta: i32, effect: HitEffect) {
        self.content
            .add_instruction(Opcode::FireTorpedo as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(hit)
            .add_parameter(launcher)
            .add_parameter(torpedo_count_delta)
            .add_parameter(effect.damage_done)
            .add_parameter(effect.crew_killed)
            .add_parameter(effect.shield_lost);
    }

    fn update_beam(&mut self, side: Side, slot: i32, value: i32) {
        self.content
            .add_instruction(Opcode::UpdateBeam as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(slot)
            .add_parameter(value);
    }

    fn update_launcher(&mut self, side: Side, slot: i32, value: i32) {
        self.content
            .add_instruction(Opcode::UpdateLauncher as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(slot)
            .add_parameter(value);
    }

    fn move_object(&mut self, side: Side, position: i32) {
        self.content
            .add_instruction(Opcode::MoveObject as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(position);
    }

    fn move_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.content
            .add_instruction(Opcode::MoveFighter as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(track)
            .add_parameter(position)
            .add_parameter(distance)
            .add_parameter(status as i32);
    }

    fn kill_object(&mut self, side: Side) {
        self.content
            .add_instruction(Opcode::KillObject as i32)
            .add_parameter(side_to_param(side));
    }

    fn update_object(&mut self, side: Side, damage: i32, crew: i32, shield: i32) {
        self.content
            .add_instruction(Opcode::UpdateObject as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(damage)
            .add_parameter(crew)
            .add_parameter(shield);
    }

    fn update_ammo(&mut self, side: Side, num_torpedoes: i32, num_fighters: i32) {
        self.content
            .add_instruction(Opcode::UpdateAmmo as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(num_torpedoes)
            .add_parameter(num_fighters);
    }

    fn update_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, status: FighterStatus) {
        self.content
            .add_instruction(Opcode::UpdateFighter as i32)
            .add_parameter(side_to_param(side))
            .add_parameter(track)
            .add_parameter(position)
            .add_parameter(distance)
            .add_parameter(status as i32);
    }

    fn set_result(&mut self, result: BattleResult) {
        self.content
            .add_instruction(Opcode::SetResult as i32)
            .add_parameter(result.to_integer());
    }

    fn remove_animations(&mut self) {
        self.content.add_instruction(Opcode::RemoveAnimations as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Spy {
        calls: Vec<String>,
    }

    impl EventListener for Spy {
        fn place_object(&mut self, side: Side, info: UnitInfo) {
            self.calls.push(format!("place_object({side:?}, {})", info.name));
        }
        fn update_time(&mut self, time: i32, distance: i32) {
            self.calls.push(format!("update_time({time}, {distance})"));
        }
        fn start_fighter(&mut self, side: Side, track: i32, position: i32, distance: i32, fighter_count_delta: i32) {
            self.calls
                .push(format!("start_fighter({side:?}, {track}, {position}, {distance}, {fighter_count_delta})"));
        }
        fn land_fighter(&mut self, _side: Side, _track: i32, _fighter_count_delta: i32) {}
        fn kill_fighter(&mut self, side: Side, track: i32) {
            self.calls.push(format!("kill_fighter({side:?}, {track})"));
        }
        fn fire_beam(&mut self, _side: Side, _track: i32, _target: i32, _hit: i32, _damage: i32, _kill: i32, _effect: HitEffect) {}
        fn fire_torpedo(&mut self, _side: Side, _hit: i32, _launcher: i32, _torpedo_count_delta: i32, _effect: HitEffect) {}
        fn update_beam(&mut self, _side: Side, _slot: i32, _value: i32) {}
        fn update_launcher(&mut self, _side: Side, _slot: i32, _value: i32) {}
        fn move_object(&mut self, side: Side, position: i32) {
            self.calls.push(format!("move_object({side:?}, {position})"));
        }
        fn move_fighter(&mut self, _side: Side, _track: i32, _position: i32, _distance: i32, _status: FighterStatus) {}
        fn update_object(&mut self, _side: Side, _damage: i32, _crew: i32, _shield: i32) {}
        fn update_ammo(&mut self, _side: Side, _num_torpedoes: i32, _num_fighters: i32) {}
        fn update_fighter(&mut self, _side: Side, _track: i32, _position: i32, _distance: i32, _status: FighterStatus) {}
        fn set_result(&mut self, result: BattleResult) {
            self.calls.push(format!("set_result({})", result.to_integer()));
        }
        fn remove_animations(&mut self) {
            self.calls.push("remove_animations()".to_string());
        }
    }

    fn sample_unit(name: &str) -> UnitInfo {
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
            name: name.to_string(),
            owner_name: "Federation".into(),
            beam_name: "Laser".into(),
            launcher_name: String::new(),
        }
    }

    #[test]
    fn replay_reproduces_the_exact_call_sequence() {
        let mut recorder = EventRecorder::new();
        recorder.place_object(Side::Left, sample_unit("Fearless"));
        recorder.update_time(10, 1000);
        recorder.kill_fighter(Side::Right, 3);
        recorder.move_object(Side::Left, 42);
        recorder.set_result(BattleResult::empty());
        recorder.remove_animations();

        let mut spy = Spy::default();
        recorder.replay(&mut spy);

        assert_eq!(
            spy.calls,
            vec![
                "place_object(Left, Fearless)",
                "update_time(10, 1000)",
                "kill_fighter(Right, 3)",
                "move_object(Left, 42)",
                "set_result(0)",
                "remove_animations()",
            ]
        );
    }

    #[test]
    fn swap_content_hands_a_recording_to_another_instruction_list() {
        let mut recorder = EventRecorder::new();
        recorder.update_time(1, 2);
        assert!(recorder.size() > 0);

        let mut carrier = InstructionList::new();
        recorder.swap_content(&mut carrier);
        assert_eq!(recorder.size(), 0);

        let mut loaded = EventRecorder::new();
        loaded.swap_content(&mut carrier);
        let mut spy = Spy::default();
        loaded.replay(&mut spy);
        assert_eq!(spy.calls, vec!["update_time(1, 2)"]);
    }
}
