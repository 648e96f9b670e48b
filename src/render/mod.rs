//! Display-agnostic frame composition.
//!
//! The renderer turns a session into an ordered list of draw commands in
//! screen space. It never touches a real surface; whoever receives the
//! [`RenderFrame`] executes the commands.

use rand::Rng;
use serde::Serialize;

use crate::{
    config::RenderConfig,
    events::SessionEvent,
    input::{Camera, Viewport},
    session::{GameState, Session},
    stats::{FinalReport, Hud, Weather},
    world::{ItemKind, Player, ResearchItem, Shelter, Vec2},
};

const BACKGROUND: &str = "#87CEEB";
const GRID_COLOR: &str = "rgba(255, 255, 255, 0.1)";
const SHELTER_COLOR: &str = "#ffa726";
const SHELTER_HALF: f64 = 25.0;
const SHELTER_LABEL_OFFSET: f64 = 40.0;
const SNOW_COLOR: &str = "rgba(255, 255, 255, 0.5)";
const MINIMAP_BACKGROUND: &str = "rgba(0, 0, 0, 0.8)";
const MAX_GRID_LINES: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Fills the whole surface.
    Fill { color: String },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: String,
        glow: bool,
    },
    Circle {
        x: f64,
        y: f64,
        r: f64,
        color: String,
        glow: bool,
    },
    Ellipse {
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        color: String,
        glow: bool,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        width: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
        font: String,
    },
}

impl DrawCommand {
    fn rect(x: f64, y: f64, w: f64, h: f64, color: &str) -> Self {
        DrawCommand::Rect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
            glow: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub frame: u64,
    pub state: GameState,
    pub weather: Weather,
    pub viewport: Viewport,
    pub camera: Option<Camera>,
    pub hud: Option<Hud>,
    pub report: Option<FinalReport>,
    pub scene: Vec<DrawCommand>,
    pub minimap: Vec<DrawCommand>,
    pub events: Vec<SessionEvent>,
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Builds the frame for the current session. Without a player (menus)
    /// only the state is reported. Events are left for the caller.
    pub fn compose<R: Rng + ?Sized>(&self, session: &Session, frame: u64, rng: &mut R) -> RenderFrame {
        let viewport = session.viewport();
        let mut out = RenderFrame {
            frame,
            state: session.state(),
            weather: session.weather(),
            viewport,
            camera: None,
            hud: None,
            report: session.final_report().cloned(),
            scene: Vec::new(),
            minimap: Vec::new(),
            events: Vec::new(),
        };

        let (Some(player), Some(camera)) = (session.player(), session.camera()) else {
            return out;
        };

        let world = session.world();
        let elapsed = session.stats().survival_time as f64;
        let mut scene = Vec::with_capacity(world.items().len() + world.shelters().len() + 64);
        scene.push(DrawCommand::Fill {
            color: BACKGROUND.to_string(),
        });
        self.draw_grid(&mut scene, camera, viewport);
        draw_shelters(&mut scene, camera, world.shelters());
        self.draw_items(&mut scene, camera, viewport, world.items());
        draw_player(&mut scene, camera, player);
        self.draw_weather(&mut scene, session.weather(), viewport, elapsed, rng);

        out.camera = Some(camera);
        out.hud = Some(session.stats().hud());
        out.scene = scene;
        out.minimap = self.minimap(player, world.items(), world.shelters());
        out
    }

    /// Lines are stepped by index, not by accumulation, and each axis stops
    /// at `MAX_GRID_LINES`.
    fn draw_grid(&self, scene: &mut Vec<DrawCommand>, camera: Camera, viewport: Viewport) {
        let grid = self.config.grid_size;
        for x in grid_positions(camera.x, viewport.width, grid) {
            scene.push(DrawCommand::Line {
                x1: x - camera.x,
                y1: 0.0,
                x2: x - camera.x,
                y2: viewport.height,
                color: GRID_COLOR.to_string(),
                width: 1.0,
            });
        }
        for y in grid_positions(camera.y, viewport.height, grid) {
            scene.push(DrawCommand::Line {
                x1: 0.0,
                y1: y - camera.y,
                x2: viewport.width,
                y2: y - camera.y,
                color: GRID_COLOR.to_string(),
                width: 1.0,
            });
        }
    }

    fn draw_items(
        &self,
        scene: &mut Vec<DrawCommand>,
        camera: Camera,
        viewport: Viewport,
        items: &[ResearchItem],
    ) {
        for item in items {
            let screen = camera.to_screen(item.position);
            if !on_screen(screen, viewport, self.config.cull_margin) {
                continue;
            }
            scene.push(item_shape(item, screen));
        }
    }

    fn draw_weather<R: Rng + ?Sized>(
        &self,
        scene: &mut Vec<DrawCommand>,
        weather: Weather,
        viewport: Viewport,
        elapsed: f64,
        rng: &mut R,
    ) {
        if !weather.has_snowfall() {
            return;
        }
        let size = if weather == Weather::Blizzard { 3.0 } else { 2.0 };
        for _ in 0..self.config.snow_particles {
            let x = (rng.gen::<f64>() * viewport.width + elapsed * 2.0) % viewport.width;
            let y = (rng.gen::<f64>() * viewport.height + elapsed * 5.0) % viewport.height;
            scene.push(DrawCommand::rect(x, y, size, size, SNOW_COLOR));
        }
    }

    /// Fixed-scale map centred on the player. Items beyond the map edge are
    /// dropped; shelters are always emitted and left to the surface to clip.
    fn minimap(
        &self,
        player: &Player,
        items: &[ResearchItem],
        shelters: &[Shelter],
    ) -> Vec<DrawCommand> {
        let size = self.config.minimap_size;
        let scale = self.config.minimap_scale;
        let centre = size / 2.0;
        let project = |at: Vec2| {
            Vec2::new(
                centre + (at.x - player.position.x) * scale,
                centre + (at.y - player.position.y) * scale,
            )
        };

        let mut out = Vec::with_capacity(items.len() + shelters.len() + 2);
        out.push(DrawCommand::rect(0.0, 0.0, size, size, MINIMAP_BACKGROUND));
        out.push(DrawCommand::rect(
            centre - 2.0,
            centre - 2.0,
            4.0,
            4.0,
            &player.color,
        ));
        for item in items {
            let mapped = project(item.position);
            if (0.0..=size).contains(&mapped.x) && (0.0..=size).contains(&mapped.y) {
                out.push(DrawCommand::rect(
                    mapped.x - 1.0,
                    mapped.y - 1.0,
                    2.0,
                    2.0,
                    item.color,
                ));
            }
        }
        for shelter in shelters {
            let mapped = project(shelter.position);
            out.push(DrawCommand::rect(
                mapped.x - 2.0,
                mapped.y - 2.0,
                4.0,
                4.0,
                SHELTER_COLOR,
            ));
        }
        out
    }
}

/// World coordinates of grid lines from the first multiple of `grid` at or
/// before `origin` up to `origin + extent`.
fn grid_positions(origin: f64, extent: f64, grid: f64) -> impl Iterator<Item = f64> {
    let first = (origin / grid).floor() * grid;
    let end = origin + extent;
    (0..MAX_GRID_LINES)
        .map(move |n| first + n as f64 * grid)
        .take_while(move |at| *at < end)
}

fn on_screen(screen: Vec2, viewport: Viewport, margin: f64) -> bool {
    screen.x > -margin
        && screen.x < viewport.width + margin
        && screen.y > -margin
        && screen.y < viewport.height + margin
}

fn item_shape(item: &ResearchItem, at: Vec2) -> DrawCommand {
    let color = item.color.to_string();
    match item.kind {
        ItemKind::IceCore => DrawCommand::Rect {
            x: at.x - 8.0,
            y: at.y - 8.0,
            w: 16.0,
            h: 16.0,
            color,
            glow: true,
        },
        ItemKind::Meteorite => DrawCommand::Circle {
            x: at.x,
            y: at.y,
            r: 10.0,
            color,
            glow: true,
        },
        ItemKind::Fossil => DrawCommand::Ellipse {
            x: at.x,
            y: at.y,
            rx: 12.0,
            ry: 8.0,
            color,
            glow: true,
        },
    }
}

fn draw_shelters(scene: &mut Vec<DrawCommand>, camera: Camera, shelters: &[Shelter]) {
    for shelter in shelters {
        let at = camera.to_screen(shelter.position);
        scene.push(DrawCommand::rect(
            at.x - SHELTER_HALF,
            at.y - SHELTER_HALF,
            SHELTER_HALF * 2.0,
            SHELTER_HALF * 2.0,
            SHELTER_COLOR,
        ));
        scene.push(DrawCommand::Text {
            x: at.x,
            y: at.y + SHELTER_LABEL_OFFSET,
            text: "SHELTER".to_string(),
            color: "white".to_string(),
            font: "12px Arial".to_string(),
        });
    }
}

fn draw_player(scene: &mut Vec<DrawCommand>, camera: Camera, player: &Player) {
    let at = camera.to_screen(player.position);
    scene.push(DrawCommand::Circle {
        x: at.x,
        y: at.y,
        r: player.size,
        color: player.color.clone(),
        glow: false,
    });
    scene.push(DrawCommand::Line {
        x1: at.x,
        y1: at.y,
        x2: at.x,
        y2: at.y - player.size - 10.0,
        color: "white".to_string(),
        width: 3.0,
    });
}
