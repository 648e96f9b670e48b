use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::{
    config::{GameConfig, RenderConfig},
    input::{Key, Viewport},
    render::{RenderFrame, Renderer},
    rng::{RngManager, SystemRng, WEATHER_STREAM, WORLDGEN_STREAM},
    session::Session,
    systems::{ClockSystem, InteractionSystem, MovementSystem, SurvivalSystem},
};

pub struct EngineSettings {
    pub name: String,
    pub seed: u64,
    /// Real seconds between stat ticks.
    pub tick_seconds: f64,
    pub render: RenderConfig,
}

impl EngineSettings {
    pub fn from_config(config: &GameConfig, seed: u64) -> Self {
        Self {
            name: config.name.clone(),
            seed,
            tick_seconds: config.tick_seconds,
            render: config.render.clone(),
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    frame_systems: Vec<Box<dyn System>>,
    tick_systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            frame_systems: Vec::new(),
            tick_systems: Vec::new(),
        }
    }

    /// Movement and interaction every frame; clock then survival every tick.
    pub fn standard(config: &GameConfig, seed: u64) -> Self {
        Self::new(EngineSettings::from_config(config, seed))
            .with_frame_system(MovementSystem::new(config.movement.clone()))
            .with_frame_system(InteractionSystem::new(
                config.interaction.clone(),
                config.world.item_floor,
            ))
            .with_tick_system(ClockSystem::new())
            .with_tick_system(SurvivalSystem::new(config.survival.clone()))
    }

    pub fn with_frame_system(mut self, system: impl System + 'static) -> Self {
        self.frame_systems.push(Box::new(system));
        self
    }

    pub fn with_tick_system(mut self, system: impl System + 'static) -> Self {
        self.tick_systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        info!(
            name = %self.settings.name,
            seed = self.settings.seed,
            frame_systems = self.frame_systems.len(),
            tick_systems = self.tick_systems.len(),
            "engine built"
        );
        Engine {
            rng: RngManager::new(self.settings.seed),
            frame_systems: self.frame_systems,
            tick_systems: self.tick_systems,
            renderer: Renderer::new(self.settings.render.clone()),
            settings: self.settings,
            frame: 0,
            tick: 0,
            tick_accumulator: 0.0,
        }
    }
}

/// Input a presentation layer forwards to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Key { key: String, pressed: bool },
    Start,
    Menu,
    Lobby,
    HowToPlay,
    Resize { width: f64, height: f64 },
}

/// Drives a session: frame systems each frame, tick systems whenever a
/// full tick period of playing time has accumulated, then a render.
pub struct Engine {
    rng: RngManager,
    frame_systems: Vec<Box<dyn System>>,
    tick_systems: Vec<Box<dyn System>>,
    renderer: Renderer,
    settings: EngineSettings,
    frame: u64,
    tick: u64,
    tick_accumulator: f64,
}

impl Engine {
    pub fn create_session(&mut self, config: &GameConfig) -> Session {
        let mut rng = self.rng.stream(WORLDGEN_STREAM);
        Session::new(config, &mut rng)
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn command(&mut self, session: &mut Session, command: Command) -> bool {
        match command {
            Command::Key { key, pressed } => match Key::from_dom(&key) {
                Some(key) => {
                    session.set_key(key, pressed);
                    true
                }
                None => {
                    trace!(key = %key, "ignored unrecognized key");
                    false
                }
            },
            Command::Start => {
                let mut rng = self.rng.stream(WORLDGEN_STREAM);
                let started = session.start_single_player(&mut rng);
                if started {
                    self.tick_accumulator = 0.0;
                }
                started
            }
            Command::Menu => {
                session.show_menu();
                true
            }
            Command::Lobby => session.show_lobby(),
            Command::HowToPlay => session.show_how_to_play(),
            Command::Resize { width, height } => {
                if Viewport::accepts(width, height) {
                    session.resize(Viewport::new(width, height));
                    true
                } else {
                    debug!(width, height, "ignored out-of-range viewport");
                    false
                }
            }
        }
    }

    /// One frame of `dt` real time. Ticks only accrue while playing, so the
    /// first tick of a run lands one full period after it starts.
    pub fn frame(&mut self, session: &mut Session, dt: Duration) -> Result<RenderFrame> {
        self.frame += 1;
        let dt_seconds = dt.as_secs_f64();

        let ctx = SystemContext {
            frame: self.frame,
            tick: self.tick,
        };
        for system in &mut self.frame_systems {
            let mut rng = self.rng.stream(system.name());
            system.run(&ctx, session, &mut rng)?;
        }

        if session.is_playing() {
            self.tick_accumulator += dt_seconds;
            while self.tick_accumulator >= self.settings.tick_seconds {
                self.tick_accumulator -= self.settings.tick_seconds;
                self.tick(session)?;
            }
        } else {
            self.tick_accumulator = 0.0;
        }

        let mut weather_rng = self.rng.stream(WEATHER_STREAM);
        let mut frame = self.renderer.compose(session, self.frame, &mut weather_rng);
        frame.events = session.drain_events();
        Ok(frame)
    }

    /// One stat tick, in the order the tick systems were registered.
    pub fn tick(&mut self, session: &mut Session) -> Result<()> {
        self.tick += 1;
        let ctx = SystemContext {
            frame: self.frame,
            tick: self.tick,
        };
        for system in &mut self.tick_systems {
            let mut rng = self.rng.stream(system.name());
            system.run(&ctx, session, &mut rng)?;
        }
        Ok(())
    }

    pub fn run_with_hook<F>(
        &mut self,
        session: &mut Session,
        frames: u64,
        dt: Duration,
        mut hook: F,
    ) -> Result<()>
    where
        F: FnMut(RenderFrame),
    {
        for _ in 0..frames {
            let frame = self.frame(session, dt)?;
            hook(frame);
        }
        Ok(())
    }

    pub fn run(&mut self, session: &mut Session, frames: u64, dt: Duration) -> Result<()> {
        self.run_with_hook(session, frames, dt, |_| {})
    }
}

pub struct SystemContext {
    pub frame: u64,
    pub tick: u64,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        session: &mut Session,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
