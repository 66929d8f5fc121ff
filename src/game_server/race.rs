//! Race - Race configuration and the authoritative race state
//!
//! Holds the roster, the live skill objects and the finish ranking, plus the
//! mutations the tick performs on them.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::game_server::effects::{ApplyOutcome, EffectKind, EffectPayload};
use crate::game_server::error::RosterError;
use crate::game_server::racer::{Character, Racer, RacerSnapshot};
use crate::game_server::skills::{ObjectEffect, ObjectSnapshot, SkillObject};

/// Race configuration. Distances are in track units, durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Position at which a racer finishes
    pub finish_line: f32,
    /// Vertical coordinate of lane 0
    pub lane_origin: f32,
    /// Vertical distance between lanes
    pub lane_spacing: f32,
    /// Half-size of the collision box on both axes
    pub hit_tolerance: f32,
    /// Starting speed per tick
    pub base_speed: f32,
    pub min_racers: usize,
    pub max_racers: usize,
    /// Per-tick chance that an idle racer triggers its skill
    pub skill_chance: f64,
    pub skill_duration_ms: u64,
    pub boost_factor: f32,
    pub slow_factor: f32,
    pub slow_duration_ms: u64,
    pub freeze_duration_ms: u64,
    pub stun_duration_ms: u64,
    pub spin_duration_ms: u64,
    pub block_lifetime_ms: u64,
    pub spin_zone_lifetime_ms: u64,
    pub trap_lifetime_ms: u64,
    pub stun_lifetime_ms: u64,
    /// How far ahead of the caster hazards are dropped
    pub hazard_offset: f32,
    pub homing_speed: f32,
    /// Distance under which a homing projectile hits its target
    pub contact_threshold: f32,
    /// Number of lanes a spin zone covers
    pub spin_lanes: usize,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            finish_line: 900.0,
            lane_origin: 35.0,
            lane_spacing: 44.0,
            hit_tolerance: 30.0,
            base_speed: 1.0,
            min_racers: 2,
            max_racers: 10,
            skill_chance: 0.004,
            skill_duration_ms: 1500,
            boost_factor: 2.0,
            slow_factor: 0.5,
            slow_duration_ms: 2000,
            freeze_duration_ms: 1500,
            stun_duration_ms: 2000,
            spin_duration_ms: 1000,
            block_lifetime_ms: 3000,
            spin_zone_lifetime_ms: 3000,
            trap_lifetime_ms: 4000,
            stun_lifetime_ms: 3000,
            hazard_offset: 120.0,
            homing_speed: 5.0,
            contact_threshold: 20.0,
            spin_lanes: 4,
        }
    }
}

impl RaceConfig {
    /// Replace values the engine cannot run with by their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(0.0..=1.0).contains(&self.skill_chance) {
            log::warn!("skill_chance {} out of range, clamping", self.skill_chance);
            self.skill_chance = if self.skill_chance > 1.0 { 1.0 } else { 0.0 };
        }
        for (name, value, fallback) in [
            ("finish_line", &mut self.finish_line, defaults.finish_line),
            ("base_speed", &mut self.base_speed, defaults.base_speed),
            ("homing_speed", &mut self.homing_speed, defaults.homing_speed),
            ("boost_factor", &mut self.boost_factor, defaults.boost_factor),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("{name} must be positive, using {fallback}");
                *value = fallback;
            }
        }
        if !(0.0..=1.0).contains(&self.slow_factor) {
            log::warn!("slow_factor {} out of range, using default", self.slow_factor);
            self.slow_factor = defaults.slow_factor;
        }
        if self.min_racers < defaults.min_racers {
            log::warn!("min_racers raised to {}", defaults.min_racers);
            self.min_racers = defaults.min_racers;
        }
        if self.max_racers < self.min_racers {
            log::warn!("max_racers raised to {}", self.min_racers);
            self.max_racers = self.min_racers;
        }
        self
    }

    /// How long the status an object inflicts lasts
    pub fn inflicted_duration_ms(&self, effect: ObjectEffect) -> u64 {
        match effect {
            ObjectEffect::Slow => self.slow_duration_ms,
            ObjectEffect::Freeze => self.freeze_duration_ms,
            ObjectEffect::Spin => self.spin_duration_ms,
            ObjectEffect::Stun => self.stun_duration_ms,
            ObjectEffect::Block => 0,
        }
    }
}

/// Trim roster entries and check the race bounds.
///
/// The entry count must lie within `min_racers..=max_racers`, and at least
/// `min_racers` entries must be non-empty once trimmed. Empty entries are dropped.
pub fn validate_roster<S: AsRef<str>>(
    entries: &[S],
    config: &RaceConfig,
) -> Result<Vec<String>, RosterError> {
    if entries.len() < config.min_racers {
        return Err(RosterError::TooFewEntries {
            min: config.min_racers,
            found: entries.len(),
        });
    }
    if entries.len() > config.max_racers {
        return Err(RosterError::TooManyEntries {
            max: config.max_racers,
            found: entries.len(),
        });
    }

    let names: Vec<String> = entries
        .iter()
        .map(|entry| entry.as_ref().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.len() < config.min_racers {
        return Err(RosterError::TooFewNames {
            min: config.min_racers,
            found: names.len(),
        });
    }
    Ok(names)
}

/// One line of the final standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub place: usize,
    pub racer_id: u32,
    pub name: String,
    pub finish_tick: u64,
}

/// Complete race state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    pub(crate) config: RaceConfig,
    /// Roster order, which is also lane order
    pub(crate) racers: Vec<Racer>,
    pub(crate) objects: Vec<SkillObject>,
    /// Names in finish order, append-only
    pub(crate) ranking: Vec<String>,
    pub(crate) tick: u64,
    pub(crate) next_object_id: u64,
    pub(crate) completed: bool,
}

impl RaceState {
    /// Build the starting grid: one racer per validated name, lane = index,
    /// characters dealt from a shuffled pool.
    pub fn from_roster<S: AsRef<str>, R: Rng + ?Sized>(
        entries: &[S],
        config: RaceConfig,
        rng: &mut R,
    ) -> Result<Self, RosterError> {
        let config = config.sanitized();
        let names = validate_roster(entries, &config)?;

        let mut pool = Character::ALL;
        pool.shuffle(rng);

        let racers = names
            .into_iter()
            .enumerate()
            .map(|(lane, name)| {
                let character = pool[lane % pool.len()];
                Racer::new(lane as u32, name, lane, character, config.base_speed)
            })
            .collect();

        Ok(Self {
            config,
            racers,
            objects: Vec::new(),
            ranking: Vec::new(),
            tick: 0,
            next_object_id: 0,
            completed: false,
        })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn objects(&self) -> &[SkillObject] {
        &self.objects
    }

    pub fn ranking(&self) -> &[String] {
        &self.ranking
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Whether every racer has finished
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn racer(&self, id: u32) -> Option<&Racer> {
        self.racers.iter().find(|r| r.id == id)
    }

    pub(crate) fn index_of(&self, id: u32) -> Option<usize> {
        self.racers.iter().position(|r| r.id == id)
    }

    pub fn lane_y(&self, lane: usize) -> f32 {
        self.config.lane_origin + lane as f32 * self.config.lane_spacing
    }

    /// Put an object on the track, assigning it a fresh id
    pub fn spawn_object(&mut self, mut object: SkillObject) -> u64 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        object.id = id;
        self.objects.push(object);
        id
    }

    /// Apply an effect lasting `duration_ms` from `now` (`None` = until cleared).
    /// Unknown racers are a miss and return `None`.
    pub fn apply_effect(
        &mut self,
        racer_id: u32,
        kind: EffectKind,
        now: u64,
        duration_ms: Option<u64>,
    ) -> Option<ApplyOutcome> {
        let expires_at = duration_ms.map(|d| now.saturating_add(d));
        let racer = self.racers.iter_mut().find(|r| r.id == racer_id)?;
        Some(racer.apply_effect(kind, expires_at, EffectPayload::None))
    }

    /// Shield a racer against slow and freeze effects until `until` (or for good)
    pub fn grant_shield(&mut self, racer_id: u32, until: Option<u64>) -> Option<ApplyOutcome> {
        let racer = self.racers.iter_mut().find(|r| r.id == racer_id)?;
        Some(racer.apply_effect(EffectKind::Shielded, until, EffectPayload::None))
    }

    /// Whether an object's collision box covers a racer
    pub(crate) fn touches(&self, object: &SkillObject, racer: &Racer) -> bool {
        object.overlaps(racer.position, self.lane_y(racer.lane), self.config.hit_tolerance)
    }

    /// A racer may be hit by an object if it didn't cast it and is still racing
    pub(crate) fn can_hit(&self, object: &SkillObject, racer: &Racer) -> bool {
        racer.id != object.owner_id && !racer.finished && self.touches(object, racer)
    }

    /// Whether a live block hazard is holding the racer at `idx`
    pub fn is_blocked(&self, idx: usize) -> bool {
        let Some(racer) = self.racers.get(idx) else {
            return false;
        };
        self.objects
            .iter()
            .filter(|o| o.effect == ObjectEffect::Block)
            .any(|o| self.can_hit(o, racer))
    }

    /// Mark the racer at `idx` finished and rank it. Returns its place, or `None`
    /// if it had already finished.
    pub(crate) fn finish_racer(&mut self, idx: usize) -> Option<usize> {
        let finish_line = self.config.finish_line;
        let tick = self.tick;
        let racer = self.racers.get_mut(idx)?;
        if racer.finished {
            return None;
        }
        racer.position = finish_line;
        racer.finished = true;
        racer.finish_tick = Some(tick);
        self.ranking.push(racer.name.clone());
        Some(self.ranking.len())
    }

    /// Standings so far, in finish order
    pub fn results(&self) -> Vec<RaceResult> {
        let mut finishers: Vec<&Racer> = self.racers.iter().filter(|r| r.finished).collect();
        // Same-tick finishers were ranked in roster order
        finishers.sort_by_key(|r| (r.finish_tick, r.id));
        finishers
            .into_iter()
            .enumerate()
            .map(|(i, r)| RaceResult {
                place: i + 1,
                racer_id: r.id,
                name: r.name.clone(),
                finish_tick: r.finish_tick.unwrap_or_default(),
            })
            .collect()
    }

    /// Read-only view for the renderer
    pub fn get_snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            tick: self.tick,
            completed: self.completed,
            finish_line: self.config.finish_line,
            racers: self
                .racers
                .iter()
                .enumerate()
                .map(|(idx, r)| {
                    RacerSnapshot::new(
                        r,
                        self.lane_y(r.lane),
                        self.config.slow_factor,
                        self.is_blocked(idx),
                    )
                })
                .collect(),
            objects: self.objects.iter().map(ObjectSnapshot::from).collect(),
            ranking: self.ranking.clone(),
        }
    }
}

/// Compact race snapshot for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub tick: u64,
    pub completed: bool,
    pub finish_line: f32,
    pub racers: Vec<RacerSnapshot>,
    pub objects: Vec<ObjectSnapshot>,
    pub ranking: Vec<String>,
}
