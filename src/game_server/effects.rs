//! Status Effects - Timed conditions carried by a racer
//!
//! Each active effect is an entry of `kind -> expiry + payload`. Expiry is a single
//! generic pass, and any side data an effect saved is restored from its payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conditions a racer can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Slowed,
    Frozen,
    Stunned,
    Spinning,
    UsingSkill,
    /// Reserved: no skill grants it yet, see `RaceState::grant_shield`
    Shielded,
}

impl EffectKind {
    /// Slow/freeze-class effects are absorbed by a shield
    pub fn absorbed_by_shield(self) -> bool {
        matches!(self, EffectKind::Slowed | EffectKind::Frozen)
    }

    /// Effects that force the racer's speed to zero
    pub fn halts_motion(self) -> bool {
        matches!(
            self,
            EffectKind::Frozen | EffectKind::Stunned | EffectKind::Spinning
        )
    }
}

/// Side data saved when an effect starts, restored when it ends
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EffectPayload {
    #[default]
    None,
    /// Speed before a self-buff overwrote it
    SavedSpeed(f32),
}

impl EffectPayload {
    /// Put saved side data back onto the racer's speed
    pub fn restore(self, speed: &mut f32) {
        match self {
            EffectPayload::None => {}
            EffectPayload::SavedSpeed(saved) => *speed = saved,
        }
    }
}

/// A single active effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Timestamp (ms) at which the effect ends; `None` lasts for the rest of the race
    pub expires_at: Option<u64>,
    pub payload: EffectPayload,
}

impl ActiveEffect {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|end| now >= end)
    }
}

/// Result of applying an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The effect was not active and now is
    Applied,
    /// The effect was already active; only its expiry was reset
    Refreshed,
    /// A shield swallowed the effect
    Absorbed,
    /// The racer no longer accepts effects (finished)
    Ignored,
}

/// The set of effects active on one racer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    active: BTreeMap<EffectKind, ActiveEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn get(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.active.get(&kind)
    }

    /// Apply an effect. Re-applying an active effect resets its expiry and keeps the
    /// payload saved when it first started, so effects never stack.
    pub fn apply(
        &mut self,
        kind: EffectKind,
        expires_at: Option<u64>,
        payload: EffectPayload,
    ) -> ApplyOutcome {
        if kind.absorbed_by_shield() && self.is_active(EffectKind::Shielded) {
            return ApplyOutcome::Absorbed;
        }

        match self.active.get_mut(&kind) {
            Some(existing) => {
                existing.expires_at = expires_at;
                ApplyOutcome::Refreshed
            }
            None => {
                self.active.insert(kind, ActiveEffect { expires_at, payload });
                ApplyOutcome::Applied
            }
        }
    }

    /// Drop every effect whose expiry has been reached and hand them back in kind order
    pub fn take_expired(&mut self, now: u64) -> Vec<(EffectKind, ActiveEffect)> {
        let expired: Vec<EffectKind> = self
            .active
            .iter()
            .filter(|(_, effect)| effect.is_expired(now))
            .map(|(kind, _)| *kind)
            .collect();

        expired
            .into_iter()
            .filter_map(|kind| self.active.remove(&kind).map(|effect| (kind, effect)))
            .collect()
    }

    /// Whether any active effect zeroes the racer's speed
    pub fn halts_motion(&self) -> bool {
        self.active.keys().any(|kind| kind.halts_motion())
    }

    pub fn kinds(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.active.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
