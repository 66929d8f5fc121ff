//! Critter Dash - Race simulation engine
//!
//! Racers run along parallel lanes toward a finish line while randomly
//! triggered skills slow, freeze, stun, spin or block their opponents.
//! Rendering and name entry live outside this crate; they talk to the
//! engine through [`GameServer`] and the snapshot types.

pub mod game_server;

pub use game_server::{
    FrameUpdate, GameServer, GameState, RaceConfig, RaceError, RaceEvent, RaceResult,
    RaceSnapshot, RosterError, ServerStats,
};
