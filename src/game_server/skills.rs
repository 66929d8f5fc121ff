//! Skills - Skill kinds, the objects they leave on the track, and activation
//!
//! A racer's skill either buffs the racer itself or spawns skill objects:
//! stationary hazards (block, spin, slow/freeze traps) or a homing stun projectile.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::game_server::effects::{EffectKind, EffectPayload};
use crate::game_server::events::RaceEvent;
use crate::game_server::race::RaceState;

/// Skill carried by a racer, fixed at roster creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Multiply own speed until the skill ends
    Boost,
    /// Block hazard in every lane ahead of the caster
    LaneBlock,
    /// Projectile that chases one random opponent and stuns it
    HomingStun,
    /// Spin hazards in a random subset of lanes ahead of the caster
    SpinZone,
    /// Slow trap at the caster's x, in a randomly chosen lane other than its own
    SlowTrap,
    /// Freeze trap at the caster's x, in a randomly chosen lane other than its own
    FreezeTrap,
}

/// Effect a skill object has on racers it reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectEffect {
    Slow,
    Freeze,
    Block,
    Spin,
    Stun,
}

impl ObjectEffect {
    /// Status effect inflicted on contact; blocks gate motion directly instead
    pub fn status(self) -> Option<EffectKind> {
        match self {
            ObjectEffect::Slow => Some(EffectKind::Slowed),
            ObjectEffect::Freeze => Some(EffectKind::Frozen),
            ObjectEffect::Spin => Some(EffectKind::Spinning),
            ObjectEffect::Stun => Some(EffectKind::Stunned),
            ObjectEffect::Block => None,
        }
    }
}

/// A transient entity on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillObject {
    pub id: u64,
    /// Caster; never hit by its own object
    pub owner_id: u32,
    pub effect: ObjectEffect,
    pub x: f32,
    pub y: f32,
    /// Homing speed per tick, 0 for stationary hazards
    pub speed: f32,
    pub created_at: u64,
    pub duration_ms: u64,
    /// Racer a stun projectile chases
    pub target_id: Option<u32>,
}

impl SkillObject {
    /// A hazard that stays where it was dropped. The id is assigned on spawn.
    pub fn stationary(
        owner_id: u32,
        effect: ObjectEffect,
        x: f32,
        y: f32,
        created_at: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: 0,
            owner_id,
            effect,
            x,
            y,
            speed: 0.0,
            created_at,
            duration_ms,
            target_id: None,
        }
    }

    /// A stun projectile chasing `target_id`
    pub fn homing(
        owner_id: u32,
        target_id: u32,
        x: f32,
        y: f32,
        speed: f32,
        created_at: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            speed,
            target_id: Some(target_id),
            ..Self::stationary(owner_id, ObjectEffect::Stun, x, y, created_at, duration_ms)
        }
    }

    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.duration_ms)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at()
    }

    /// Box test against a point, `tolerance` on both axes
    pub fn overlaps(&self, x: f32, y: f32, tolerance: f32) -> bool {
        (x - self.x).abs() < tolerance && (y - self.y).abs() < tolerance
    }

    /// Move up to `speed` toward a point. Returns the distance left afterwards.
    pub fn step_toward(&mut self, target_x: f32, target_y: f32) -> f32 {
        let dx = target_x - self.x;
        let dy = target_y - self.y;
        let dist = dx.hypot(dy);
        if dist <= self.speed.max(0.0) {
            self.x = target_x;
            self.y = target_y;
            return 0.0;
        }

        self.x += dx / dist * self.speed;
        self.y += dy / dist * self.speed;
        dist - self.speed
    }
}

/// Compact object state for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: u64,
    pub owner_id: u32,
    pub effect: ObjectEffect,
    pub x: f32,
    pub y: f32,
}

impl From<&SkillObject> for ObjectSnapshot {
    fn from(object: &SkillObject) -> Self {
        Self {
            id: object.id,
            owner_id: object.owner_id,
            effect: object.effect,
            x: object.x,
            y: object.y,
        }
    }
}

fn spawn(state: &mut RaceState, object: SkillObject, events: &mut Vec<RaceEvent>) {
    let owner_id = object.owner_id;
    let effect = object.effect;
    let object_id = state.spawn_object(object);
    events.push(RaceEvent::ObjectSpawned {
        object_id,
        owner_id,
        effect,
    });
}

/// Trigger the skill of the racer at `idx`. Returns false when the racer is not
/// eligible (finished, already using its skill, or without a skill).
pub(crate) fn activate<R: Rng + ?Sized>(
    state: &mut RaceState,
    idx: usize,
    now: u64,
    rng: &mut R,
    events: &mut Vec<RaceEvent>,
) -> bool {
    let config = state.config.clone();
    let Some(caster) = state.racers.get_mut(idx) else {
        return false;
    };
    if !caster.can_activate_skill() {
        return false;
    }
    let Some(skill) = caster.skill else {
        return false;
    };

    let payload = match skill {
        SkillKind::Boost => EffectPayload::SavedSpeed(caster.base_speed),
        _ => EffectPayload::None,
    };
    let skill_end = now.saturating_add(config.skill_duration_ms);
    caster.apply_effect(EffectKind::UsingSkill, Some(skill_end), payload);
    if skill == SkillKind::Boost {
        caster.base_speed *= config.boost_factor;
    }

    let caster_id = caster.id;
    let caster_lane = caster.lane;
    let caster_x = caster.position;
    let ahead_x = caster_x + config.hazard_offset;
    let lane_count = state.racers.len();
    events.push(RaceEvent::SkillActivated {
        racer_id: caster_id,
        skill,
    });

    match skill {
        SkillKind::Boost => {}

        SkillKind::LaneBlock => {
            for lane in 0..lane_count {
                let y = state.lane_y(lane);
                let block = SkillObject::stationary(
                    caster_id,
                    ObjectEffect::Block,
                    ahead_x,
                    y,
                    now,
                    config.block_lifetime_ms,
                );
                spawn(state, block, events);
            }
        }

        SkillKind::HomingStun => {
            let candidates: Vec<u32> = state
                .racers
                .iter()
                .filter(|r| r.id != caster_id && !r.finished)
                .map(|r| r.id)
                .collect();
            if let Some(&target_id) = candidates.choose(rng) {
                let stun = SkillObject::homing(
                    caster_id,
                    target_id,
                    caster_x,
                    state.lane_y(caster_lane),
                    config.homing_speed,
                    now,
                    config.stun_lifetime_ms,
                );
                spawn(state, stun, events);
            }
        }

        SkillKind::SpinZone => {
            let amount = config.spin_lanes.min(lane_count);
            let mut lanes = index::sample(rng, lane_count, amount).into_vec();
            lanes.sort_unstable();
            for lane in lanes {
                let y = state.lane_y(lane);
                let zone = SkillObject::stationary(
                    caster_id,
                    ObjectEffect::Spin,
                    ahead_x,
                    y,
                    now,
                    config.spin_zone_lifetime_ms,
                );
                spawn(state, zone, events);
            }
        }

        SkillKind::SlowTrap | SkillKind::FreezeTrap => {
            let effect = if skill == SkillKind::SlowTrap {
                ObjectEffect::Slow
            } else {
                ObjectEffect::Freeze
            };
            let other_lanes: Vec<usize> = (0..lane_count).filter(|&l| l != caster_lane).collect();
            if let Some(&lane) = other_lanes.choose(rng) {
                let y = state.lane_y(lane);
                let trap = SkillObject::stationary(
                    caster_id,
                    effect,
                    caster_x,
                    y,
                    now,
                    config.trap_lifetime_ms,
                );
                spawn(state, trap, events);
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::race::RaceConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn race(names: &[&str]) -> (RaceState, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let state = RaceState::from_roster(names, RaceConfig::default(), &mut rng).unwrap();
        (state, rng)
    }

    fn cast(state: &mut RaceState, rng: &mut StdRng, idx: usize, skill: SkillKind) -> Vec<RaceEvent> {
        state.racers[idx].skill = Some(skill);
        let mut events = Vec::new();
        assert!(activate(state, idx, 1000, rng, &mut events));
        events
    }

    #[test]
    fn boost_doubles_speed_and_saves_the_old_one() {
        let (mut state, mut rng) = race(&["A", "B"]);
        cast(&mut state, &mut rng, 0, SkillKind::Boost);

        let caster = &state.racers[0];
        assert_eq!(caster.base_speed, 2.0);
        let effect = caster.effects.get(EffectKind::UsingSkill).unwrap();
        assert_eq!(effect.payload, EffectPayload::SavedSpeed(1.0));
        assert_eq!(effect.expires_at, Some(2500));
        assert!(state.objects.is_empty());
    }

    #[test]
    fn lane_block_covers_every_lane_ahead() {
        let (mut state, mut rng) = race(&["A", "B", "C"]);
        state.racers[1].position = 50.0;
        cast(&mut state, &mut rng, 1, SkillKind::LaneBlock);

        assert_eq!(state.objects.len(), 3);
        for (lane, object) in state.objects.iter().enumerate() {
            assert_eq!(object.effect, ObjectEffect::Block);
            assert_eq!(object.x, 170.0);
            assert_eq!(object.y, state.lane_y(lane));
            assert_eq!(object.owner_id, 1);
        }
    }

    #[test]
    fn homing_stun_never_targets_caster_or_finished() {
        let (mut state, mut rng) = race(&["A", "B", "C"]);
        state.racers[1].finished = true;
        cast(&mut state, &mut rng, 0, SkillKind::HomingStun);

        assert_eq!(state.objects.len(), 1);
        let stun = &state.objects[0];
        assert_eq!(stun.effect, ObjectEffect::Stun);
        assert_eq!(stun.target_id, Some(2));
        assert_eq!(stun.speed, 5.0);
    }

    #[test]
    fn homing_stun_without_candidates_spawns_nothing() {
        let (mut state, mut rng) = race(&["A", "B"]);
        state.racers[1].finished = true;
        cast(&mut state, &mut rng, 0, SkillKind::HomingStun);

        assert!(state.objects.is_empty());
        assert!(state.racers[0].is_using_skill());
    }

    #[test]
    fn spin_zone_picks_distinct_lanes() {
        let (mut state, mut rng) = race(&["A", "B", "C", "D", "E", "F"]);
        cast(&mut state, &mut rng, 0, SkillKind::SpinZone);

        let mut ys: Vec<f32> = state.objects.iter().map(|o| o.y).collect();
        assert_eq!(ys.len(), 4);
        ys.dedup();
        assert_eq!(ys.len(), 4);
        assert!(state.objects.iter().all(|o| o.effect == ObjectEffect::Spin));
    }

    #[test]
    fn trap_lands_in_another_lane_at_caster_position() {
        let (mut state, mut rng) = race(&["A", "B"]);
        state.racers[0].position = 300.0;
        cast(&mut state, &mut rng, 0, SkillKind::FreezeTrap);

        let trap = &state.objects[0];
        assert_eq!(trap.effect, ObjectEffect::Freeze);
        assert_eq!(trap.x, 300.0);
        assert_eq!(trap.y, state.lane_y(1));
    }

    #[test]
    fn cannot_reactivate_while_skill_is_running() {
        let (mut state, mut rng) = race(&["A", "B"]);
        cast(&mut state, &mut rng, 0, SkillKind::Boost);

        let mut events = Vec::new();
        assert!(!activate(&mut state, 0, 1001, &mut rng, &mut events));
        assert!(events.is_empty());
        assert_eq!(state.racers[0].base_speed, 2.0);
    }

    #[test]
    fn homing_step_clamps_to_remaining_distance() {
        let mut stun = SkillObject::homing(0, 1, 0.0, 0.0, 5.0, 0, 1000);
        assert_eq!(stun.step_toward(3.0, 4.0), 0.0);
        assert_eq!((stun.x, stun.y), (3.0, 4.0));
        assert_eq!(stun.step_toward(3.0, 4.0), 0.0);
    }
}
