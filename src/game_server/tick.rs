//! Tick - One simulation step over the race state
//!
//! The passes run in a fixed order on the same mutable state, so every pass
//! sees what the previous one wrote:
//! 1. effect expiry, 2. objects (expiry, homing, collisions), 3. motion and
//! finish detection, 4. skill activation, 5. race-end check.

use rand::Rng;
use crate::game_server::effects::{ApplyOutcome, EffectKind, EffectPayload};
use crate::game_server::events::{RaceEvent, RemovalReason};
use crate::game_server::race::RaceState;
use crate::game_server::skills::{self, ObjectEffect, SkillObject};

/// Everything a tick produced besides the state change itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<RaceEvent>,
}

impl TickOutcome {
    /// Final ranking, present only on the tick the race completed
    pub fn completion(&self) -> Option<&[String]> {
        self.events.iter().find_map(|event| match event {
            RaceEvent::RaceCompleted { ranking } => Some(ranking.as_slice()),
            _ => None,
        })
    }
}

/// Advance the race by one tick at wall-clock time `now` (ms)
pub fn advance<R: Rng + ?Sized>(state: &mut RaceState, now: u64, rng: &mut R) -> TickOutcome {
    let mut events = Vec::new();
    state.tick += 1;

    expire_effects(state, now, &mut events);
    resolve_objects(state, now, &mut events);
    move_racers(state, &mut events);
    activate_skills(state, now, rng, &mut events);
    check_race_end(state, &mut events);

    TickOutcome { events }
}

fn expire_effects(state: &mut RaceState, now: u64, events: &mut Vec<RaceEvent>) {
    for racer in &mut state.racers {
        for effect in racer.expire_effects(now) {
            events.push(RaceEvent::EffectExpired {
                racer_id: racer.id,
                effect,
            });
        }
    }
}

fn resolve_objects(state: &mut RaceState, now: u64, events: &mut Vec<RaceEvent>) {
    let objects = std::mem::take(&mut state.objects);
    let mut kept = Vec::with_capacity(objects.len());

    for mut object in objects {
        let removal = if object.is_expired(now) {
            Some(RemovalReason::Expired)
        } else {
            match object.effect {
                ObjectEffect::Stun => home_in(state, &mut object, now, events),
                ObjectEffect::Slow | ObjectEffect::Freeze => spring_trap(state, &object, now, events),
                ObjectEffect::Spin => {
                    spin_overlapping(state, &object, now, events);
                    None
                }
                // Blocks are checked against racers during motion
                ObjectEffect::Block => None,
            }
        };

        match removal {
            Some(reason) => events.push(RaceEvent::ObjectRemoved {
                object_id: object.id,
                effect: object.effect,
                reason,
            }),
            None => kept.push(object),
        }
    }

    state.objects = kept;
}

/// Apply the status an object inflicts to the racer at `idx`, reporting the result
fn inflict(
    state: &mut RaceState,
    idx: usize,
    effect: ObjectEffect,
    now: u64,
    events: &mut Vec<RaceEvent>,
) -> Option<ApplyOutcome> {
    let kind = effect.status()?;
    let expires_at = now.saturating_add(state.config.inflicted_duration_ms(effect));
    let racer = state.racers.get_mut(idx)?;
    let outcome = racer.apply_effect(kind, Some(expires_at), EffectPayload::None);

    match outcome {
        ApplyOutcome::Applied | ApplyOutcome::Refreshed => events.push(RaceEvent::EffectApplied {
            racer_id: racer.id,
            effect: kind,
            expires_at: Some(expires_at),
        }),
        ApplyOutcome::Absorbed => events.push(RaceEvent::EffectAbsorbed {
            racer_id: racer.id,
            effect: kind,
        }),
        ApplyOutcome::Ignored => {}
    }
    Some(outcome)
}

/// Steer a stun projectile at its target's current position. Returns a removal
/// reason once it hits or its target is gone.
fn home_in(
    state: &mut RaceState,
    object: &mut SkillObject,
    now: u64,
    events: &mut Vec<RaceEvent>,
) -> Option<RemovalReason> {
    let Some(idx) = object.target_id.and_then(|id| state.index_of(id)) else {
        log::debug!("stun {} lost its target", object.id);
        return Some(RemovalReason::TargetLost);
    };
    let target = &state.racers[idx];
    if target.finished {
        return Some(RemovalReason::TargetLost);
    }

    let target_y = state.lane_y(target.lane);
    let remaining = object.step_toward(target.position, target_y);
    if remaining >= state.config.contact_threshold {
        return None;
    }

    inflict(state, idx, ObjectEffect::Stun, now, events);
    Some(RemovalReason::Consumed)
}

/// Slow/freeze traps hit the first eligible racer in roster order and vanish
fn spring_trap(
    state: &mut RaceState,
    object: &SkillObject,
    now: u64,
    events: &mut Vec<RaceEvent>,
) -> Option<RemovalReason> {
    let idx = state.racers.iter().position(|r| state.can_hit(object, r))?;

    inflict(state, idx, object.effect, now, events);
    Some(RemovalReason::Consumed)
}

/// Spin zones keep spinning every overlapping racer that isn't spinning already.
/// Like blocks, a zone hits all racers inside its box, not only the first in
/// roster order; that rule is reserved for consumable traps.
fn spin_overlapping(
    state: &mut RaceState,
    object: &SkillObject,
    now: u64,
    events: &mut Vec<RaceEvent>,
) {
    let victims: Vec<usize> = state
        .racers
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.effects.is_active(EffectKind::Spinning) && state.can_hit(object, r))
        .map(|(idx, _)| idx)
        .collect();

    for idx in victims {
        inflict(state, idx, ObjectEffect::Spin, now, events);
    }
}

fn move_racers(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    let finish_line = state.config.finish_line;
    let slow_factor = state.config.slow_factor;

    for idx in 0..state.racers.len() {
        if state.racers[idx].finished {
            continue;
        }
        let blocked = state.is_blocked(idx);
        let racer = &mut state.racers[idx];
        let next = racer.position + racer.effective_speed(slow_factor, blocked);

        if next < finish_line {
            racer.position = next;
            continue;
        }
        if let Some(place) = state.finish_racer(idx) {
            let racer = &state.racers[idx];
            events.push(RaceEvent::RacerFinished {
                racer_id: racer.id,
                name: racer.name.clone(),
                place,
            });
        }
    }
}

fn activate_skills<R: Rng + ?Sized>(
    state: &mut RaceState,
    now: u64,
    rng: &mut R,
    events: &mut Vec<RaceEvent>,
) {
    let chance = state.config.skill_chance;
    for idx in 0..state.racers.len() {
        if !state.racers[idx].can_activate_skill() {
            continue;
        }
        if rng.gen_bool(chance) {
            skills::activate(state, idx, now, rng, events);
        }
    }
}

fn check_race_end(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    if state.completed || state.ranking.len() != state.racers.len() {
        return;
    }
    state.completed = true;
    events.push(RaceEvent::RaceCompleted {
        ranking: state.ranking.clone(),
    });
}
