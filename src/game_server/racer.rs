//! Racer - Individual racer state and behavior
//!
//! Each racer owns a lane, a position along it, a base speed and a set of
//! status effects. The tick reads these to work out how far the racer moves.

use serde::{Deserialize, Serialize};
use crate::game_server::effects::{ApplyOutcome, EffectKind, EffectPayload, StatusEffects};
use crate::game_server::skills::SkillKind;

/// Playable characters. The character is the sprite key handed to the renderer
/// and decides which skill the racer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    Tiger,
    Dog,
    Panda,
    Cat,
    Fox,
    Lion,
    Rabbit,
    Sheep,
    Penguin,
    Monkey,
}

impl Character {
    pub const ALL: [Character; 10] = [
        Character::Tiger,
        Character::Dog,
        Character::Panda,
        Character::Cat,
        Character::Fox,
        Character::Lion,
        Character::Rabbit,
        Character::Sheep,
        Character::Penguin,
        Character::Monkey,
    ];

    /// Asset key for the presentation layer
    pub fn key(self) -> &'static str {
        match self {
            Character::Tiger => "tiger",
            Character::Dog => "dog",
            Character::Panda => "panda",
            Character::Cat => "cat",
            Character::Fox => "fox",
            Character::Lion => "lion",
            Character::Rabbit => "rabbit",
            Character::Sheep => "sheep",
            Character::Penguin => "penguin",
            Character::Monkey => "monkey",
        }
    }

    /// Skill assigned to racers playing this character
    pub fn skill(self) -> Option<SkillKind> {
        match self {
            Character::Tiger | Character::Rabbit => Some(SkillKind::Boost),
            Character::Lion => Some(SkillKind::LaneBlock),
            Character::Fox | Character::Cat => Some(SkillKind::HomingStun),
            Character::Panda => Some(SkillKind::SpinZone),
            Character::Dog | Character::Monkey => Some(SkillKind::SlowTrap),
            Character::Penguin => Some(SkillKind::FreezeTrap),
            Character::Sheep => None,
        }
    }
}

/// What the renderer should draw for a racer, derived from its effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    Normal,
    Skill,
    Slowed,
    Frozen,
    Stunned,
    Spinning,
    Blocked,
    Finished,
}

/// Complete state for a single racer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Racer {
    /// Roster index, never reused
    pub id: u32,
    pub name: String,
    pub character: Character,
    pub skill: Option<SkillKind>,
    /// Lane slot, fixed for the whole race
    pub lane: usize,
    /// Progress along the lane
    pub position: f32,
    /// Speed per tick; a boost overwrites it until the skill ends
    pub base_speed: f32,
    pub finished: bool,
    /// Tick on which the racer crossed the line
    pub finish_tick: Option<u64>,
    pub effects: StatusEffects,
}

impl Racer {
    pub fn new(id: u32, name: String, lane: usize, character: Character, base_speed: f32) -> Self {
        Self {
            id,
            name,
            character,
            skill: character.skill(),
            lane,
            position: 0.0,
            base_speed,
            finished: false,
            finish_tick: None,
            effects: StatusEffects::new(),
        }
    }

    pub fn is_using_skill(&self) -> bool {
        self.effects.is_active(EffectKind::UsingSkill)
    }

    /// Whether the racer may trigger its skill this tick
    pub fn can_activate_skill(&self) -> bool {
        !self.finished && !self.is_using_skill() && self.skill.is_some()
    }

    /// Apply an effect ending at `expires_at`. Finished racers ignore everything.
    pub fn apply_effect(
        &mut self,
        kind: EffectKind,
        expires_at: Option<u64>,
        payload: EffectPayload,
    ) -> ApplyOutcome {
        if self.finished {
            return ApplyOutcome::Ignored;
        }
        self.effects.apply(kind, expires_at, payload)
    }

    /// Clear expired effects, restoring whatever side data they saved
    pub fn expire_effects(&mut self, now: u64) -> Vec<EffectKind> {
        self.effects
            .take_expired(now)
            .into_iter()
            .map(|(kind, effect)| {
                effect.payload.restore(&mut self.base_speed);
                kind
            })
            .collect()
    }

    /// Distance covered this tick given the current effects
    pub fn effective_speed(&self, slow_factor: f32, blocked: bool) -> f32 {
        if self.finished || blocked || self.effects.halts_motion() {
            return 0.0;
        }
        if self.effects.is_active(EffectKind::Slowed) {
            self.base_speed * slow_factor
        } else {
            self.base_speed
        }
    }

    pub fn visual_state(&self, blocked: bool) -> VisualState {
        let effects = &self.effects;
        if self.finished {
            VisualState::Finished
        } else if effects.is_active(EffectKind::Stunned) {
            VisualState::Stunned
        } else if effects.is_active(EffectKind::Frozen) {
            VisualState::Frozen
        } else if effects.is_active(EffectKind::Spinning) {
            VisualState::Spinning
        } else if blocked {
            VisualState::Blocked
        } else if effects.is_active(EffectKind::Slowed) {
            VisualState::Slowed
        } else if self.is_using_skill() {
            VisualState::Skill
        } else {
            VisualState::Normal
        }
    }
}

/// Compact racer state for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RacerSnapshot {
    pub id: u32,
    pub name: String,
    pub character: Character,
    pub lane: usize,
    pub lane_y: f32,
    pub position: f32,
    pub speed: f32,
    pub finished: bool,
    pub shielded: bool,
    pub visual: VisualState,
}

impl RacerSnapshot {
    pub fn new(racer: &Racer, lane_y: f32, slow_factor: f32, blocked: bool) -> Self {
        Self {
            id: racer.id,
            name: racer.name.clone(),
            character: racer.character,
            lane: racer.lane,
            lane_y,
            position: racer.position,
            speed: racer.effective_speed(slow_factor, blocked),
            finished: racer.finished,
            shielded: racer.effects.is_active(EffectKind::Shielded),
            visual: racer.visual_state(blocked),
        }
    }
}
