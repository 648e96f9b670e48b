pub mod config;
pub mod engine;
pub mod events;
pub mod input;
pub mod render;
pub mod rng;
pub mod session;
pub mod stats;
pub mod systems;
pub mod web;
pub mod world;
pub mod worldgen;

pub use config::{ConfigLoader, GameConfig};
pub use engine::{Command, Engine, EngineBuilder, EngineSettings};
pub use render::{DrawCommand, RenderFrame};
pub use session::{GameState, Session};
pub use stats::{Stats, Weather};
