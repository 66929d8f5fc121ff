//! Game Server Module
//!
//! Race simulation engine: racers, status effects, skill objects and the
//! per-frame tick, driven by the lifecycle controller in `simulation`.

pub mod effects;
pub mod error;
pub mod events;
pub mod race;
pub mod racer;
pub mod skills;
pub mod simulation;
pub mod tick;

pub use effects::{ApplyOutcome, EffectKind, StatusEffects};
pub use error::{RaceError, RosterError};
pub use events::{RaceEvent, RemovalReason};
pub use race::{validate_roster, RaceConfig, RaceResult, RaceSnapshot, RaceState};
pub use racer::{Character, Racer, RacerSnapshot, VisualState};
pub use skills::{ObjectEffect, ObjectSnapshot, SkillKind, SkillObject};
pub use simulation::{FrameUpdate, GameServer, GameState, ServerStats};
pub use tick::{advance, TickOutcome};
