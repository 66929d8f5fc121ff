//! Typed notifications emitted by a tick.

use serde::Serialize;
use crate::game_server::effects::EffectKind;
use crate::game_server::skills::{ObjectEffect, SkillKind};

/// Why a skill object left the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Lifetime ran out
    Expired,
    /// Trap or projectile hit a racer
    Consumed,
    /// Homing target vanished or finished
    TargetLost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RaceEvent {
    SkillActivated {
        racer_id: u32,
        skill: SkillKind,
    },
    ObjectSpawned {
        object_id: u64,
        owner_id: u32,
        effect: ObjectEffect,
    },
    ObjectRemoved {
        object_id: u64,
        effect: ObjectEffect,
        reason: RemovalReason,
    },
    EffectApplied {
        racer_id: u32,
        effect: EffectKind,
        expires_at: Option<u64>,
    },
    EffectAbsorbed {
        racer_id: u32,
        effect: EffectKind,
    },
    EffectExpired {
        racer_id: u32,
        effect: EffectKind,
    },
    RacerFinished {
        racer_id: u32,
        name: String,
        place: usize,
    },
    RaceCompleted {
        ranking: Vec<String>,
    },
}
