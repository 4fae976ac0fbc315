pub mod error;
pub mod grid;
pub mod models;
pub mod profile;

pub use chrono;

pub use error::{EngineError, NumberSetError, Result};
pub use grid::CandidateGrid;
pub use models::{Draw, DrawFilter, DrawSequence, Pool, PoolLayout};
pub use profile::{GameProfile, GameType, TierRule};
