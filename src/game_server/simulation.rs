//! Simulation - Race lifecycle controller
//!
//! Owns the race state between frames, accepts rosters, drives ticks from
//! the caller's clock and reports completion to the presentation layer.

use std::time::Instant;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use crate::game_server::error::RaceError;
use crate::game_server::events::RaceEvent;
use crate::game_server::race::{RaceConfig, RaceResult, RaceSnapshot, RaceState};
use crate::game_server::tick;

/// Number of tick timings kept for the rolling average
const TICK_TIME_WINDOW: usize = 60;

/// Lifecycle of the game server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    AwaitingRoster,
    Racing,
    Finished,
}

/// Server statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    pub tick_count: u64,
    pub avg_tick_time_ms: f32,
    pub racer_count: u32,
    pub object_count: u32,
    pub game_state: GameState,
}

/// Result of one frame for the renderer
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub snapshot: RaceSnapshot,
    pub events: Vec<RaceEvent>,
    /// Final ranking, set only on the frame the race completed
    pub completion: Option<Vec<String>>,
}

/// Main game server
pub struct GameServer<R = StdRng> {
    /// Current lifecycle state
    state: GameState,
    /// Active race (if any)
    race: Option<RaceState>,
    /// Config applied to every new race
    config: RaceConfig,
    /// Source of every random decision
    rng: R,
    /// Recent tick processing times (ms)
    tick_times: Vec<f32>,
}

impl GameServer<StdRng> {
    /// Create a game server seeded from the OS
    pub fn new(config: RaceConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a game server with a reproducible seed
    pub fn seeded(config: RaceConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameServer<R> {
    /// Create a game server with an injected random source
    pub fn with_rng(config: RaceConfig, rng: R) -> Self {
        Self {
            state: GameState::AwaitingRoster,
            race: None,
            config: config.sanitized(),
            rng,
            tick_times: Vec::with_capacity(TICK_TIME_WINDOW),
        }
    }

    /// Start a race with the given names
    pub fn submit_roster<S: AsRef<str>>(&mut self, names: &[S]) -> Result<RaceSnapshot, RaceError> {
        if self.state != GameState::AwaitingRoster {
            return Err(RaceError::NotAwaitingRoster(self.state));
        }

        let race = RaceState::from_roster(names, self.config.clone(), &mut self.rng)?;
        log::info!("Race started with {} racers", race.racers().len());
        for racer in race.racers() {
            log::debug!(
                "lane {}: {} as {} ({:?})",
                racer.lane,
                racer.name,
                racer.character.key(),
                racer.skill
            );
        }

        let snapshot = race.get_snapshot();
        self.race = Some(race);
        self.state = GameState::Racing;
        self.tick_times.clear();
        Ok(snapshot)
    }

    /// Perform a single simulation tick at wall-clock time `now` (ms)
    pub fn tick(&mut self, now: u64) -> Option<FrameUpdate> {
        let race = self.race.as_mut()?;

        let tick_start = Instant::now();
        let outcome = tick::advance(race, now, &mut self.rng);
        let tick_time = tick_start.elapsed().as_secs_f32() * 1000.0;

        self.tick_times.push(tick_time);
        if self.tick_times.len() > TICK_TIME_WINDOW {
            self.tick_times.remove(0);
        }

        for event in &outcome.events {
            log::debug!("tick {}: {:?}", race.tick_count(), event);
        }

        let completion = outcome.completion().map(<[String]>::to_vec);
        if let Some(ranking) = &completion {
            self.state = GameState::Finished;
            log::info!("Race finished after {} ticks: {}", race.tick_count(), ranking.join(", "));
        }

        Some(FrameUpdate {
            snapshot: race.get_snapshot(),
            events: outcome.events,
            completion,
        })
    }

    /// Get current race snapshot
    pub fn get_snapshot(&self) -> Option<RaceSnapshot> {
        self.race.as_ref().map(|r| r.get_snapshot())
    }

    /// Get race results so far
    pub fn get_results(&self) -> Option<Vec<RaceResult>> {
        self.race.as_ref().map(|r| r.results())
    }

    /// Read-only access to the race state
    pub fn race(&self) -> Option<&RaceState> {
        self.race.as_ref()
    }

    /// Mutable access for hooks outside the tick, such as granting a shield.
    /// Only call between ticks.
    pub fn race_mut(&mut self) -> Option<&mut RaceState> {
        self.race.as_mut()
    }

    /// Get server statistics
    pub fn get_stats(&self) -> ServerStats {
        let avg_tick_time = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32
        };

        ServerStats {
            tick_count: self.race.as_ref().map(|r| r.tick_count()).unwrap_or(0),
            avg_tick_time_ms: avg_tick_time,
            racer_count: self.race.as_ref().map(|r| r.racers().len() as u32).unwrap_or(0),
            object_count: self.race.as_ref().map(|r| r.objects().len() as u32).unwrap_or(0),
            game_state: self.state,
        }
    }

    /// Get current lifecycle state
    pub fn get_state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Drop the race and go back to waiting for a roster
    pub fn reset(&mut self) {
        if self.race.take().is_some() {
            log::info!("Race reset");
        }
        self.state = GameState::AwaitingRoster;
        self.tick_times.clear();
    }
}

impl Default for GameServer<StdRng> {
    fn default() -> Self {
        Self::new(RaceConfig::default())
    }
}
